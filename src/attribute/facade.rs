//! A uniform read surface over an attribute, whether it's held directly by
//! an `MftAttribute` or only known through an `$ATTRIBUTE_LIST` entry
//! pointing at another MFT record. Typed-value materialization is lazy and
//! cached behind a lock, so concurrent callers asking for the same
//! attribute's value block on the first materialization rather than racing
//! to decode it twice.
use std::sync::RwLock;

use num_traits::FromPrimitive;
use winstructs::ntfs::mft_reference::MftReference;

use crate::attribute::data_run::DataRun;
use crate::attribute::header::ResidentialHeader;
use crate::attribute::value::AttributeValue;
use crate::attribute::x20::AttributeListEntry;
use crate::attribute::{AttributeDataFlags, MftAttribute, MftAttributeType};
use crate::err::{self, Result};
use crate::orchestrator::{self, ReadFlags};
use crate::stream::ClusterGeometry;
use crate::ReadSeek;

/// Which kind of source a facade is reading through. An attribute-list
/// entry only carries enough of the on-disk `ATTRIBUTE_LIST_ENTRY` to locate
/// the record that actually holds the attribute; it never exposes the
/// attribute's own data, so several accessors read as empty/zero/unavailable
/// on this binding rather than following the reference themselves.
pub enum AttributeBinding<'a> {
    Owning(&'a MftAttribute),
    ListEntry(&'a AttributeListEntry),
}

enum LazyValue {
    NotYet,
    Ready(AttributeValue),
    Failed(String),
}

pub struct AttributeFacade<'a> {
    binding: AttributeBinding<'a>,
    value: RwLock<LazyValue>,
}

impl<'a> AttributeFacade<'a> {
    pub fn owning(attribute: &'a MftAttribute) -> Self {
        AttributeFacade {
            binding: AttributeBinding::Owning(attribute),
            value: RwLock::new(LazyValue::NotYet),
        }
    }

    pub fn list_entry(entry: &'a AttributeListEntry) -> Self {
        AttributeFacade {
            binding: AttributeBinding::ListEntry(entry),
            value: RwLock::new(LazyValue::NotYet),
        }
    }

    pub fn type_code(&self) -> Result<MftAttributeType> {
        match &self.binding {
            AttributeBinding::Owning(attribute) => Ok(attribute.header.type_code),
            AttributeBinding::ListEntry(entry) => MftAttributeType::from_u32(entry.attribute_type)
                .ok_or(err::Error::UnknownAttributeType {
                    attribute_type: entry.attribute_type,
                }),
        }
    }

    pub fn data_flags(&self) -> AttributeDataFlags {
        match &self.binding {
            AttributeBinding::Owning(attribute) => attribute.header.data_flags,
            AttributeBinding::ListEntry(_) => AttributeDataFlags::empty(),
        }
    }

    pub fn utf8_name(&self) -> &str {
        match &self.binding {
            AttributeBinding::Owning(attribute) => &attribute.header.name,
            AttributeBinding::ListEntry(entry) => &entry.name,
        }
    }

    pub fn utf8_name_size(&self) -> usize {
        self.utf8_name().len()
    }

    pub fn utf16_name_size(&self) -> usize {
        match &self.binding {
            AttributeBinding::Owning(attribute) => attribute.header.name_size as usize,
            AttributeBinding::ListEntry(entry) => entry.name_length as usize,
        }
    }

    /// The attribute's declared payload size in bytes. Always `0` through a
    /// `ListEntry` binding, which doesn't carry the referenced record's data.
    pub fn data_size(&self) -> u64 {
        match &self.binding {
            AttributeBinding::Owning(attribute) => match &attribute.header.residential_header {
                ResidentialHeader::Resident(r) => u64::from(r.data_size),
                ResidentialHeader::NonResident(nr) => nr.data_size,
            },
            AttributeBinding::ListEntry(_) => 0,
        }
    }

    /// The valid (non-stale) prefix of `data_size`. Resident data is always
    /// fully valid. Always `0` through a `ListEntry` binding.
    pub fn valid_data_size(&self) -> u64 {
        match &self.binding {
            AttributeBinding::Owning(attribute) => match &attribute.header.residential_header {
                ResidentialHeader::Resident(r) => u64::from(r.data_size),
                ResidentialHeader::NonResident(nr) => nr.valid_data_size,
            },
            AttributeBinding::ListEntry(_) => 0,
        }
    }

    /// The `(first_vcn, last_vcn)` this attribute record covers. `None` for
    /// resident data (which has no VCN range) and for a `ListEntry` binding.
    pub fn data_vcn_range(&self) -> Option<(u64, u64)> {
        match &self.binding {
            AttributeBinding::Owning(attribute) => match &attribute.header.residential_header {
                ResidentialHeader::NonResident(nr) => Some((nr.data_first_vcn, nr.data_last_vcn)),
                ResidentialHeader::Resident(_) => None,
            },
            AttributeBinding::ListEntry(_) => None,
        }
    }

    pub fn data_run_count(&self) -> usize {
        match &self.binding {
            AttributeBinding::Owning(attribute) => attribute
                .non_resident
                .as_ref()
                .map(|nr| nr.data_runs.len())
                .unwrap_or(0),
            AttributeBinding::ListEntry(_) => 0,
        }
    }

    pub fn data_run_at(&self, index: usize) -> Option<DataRun> {
        match &self.binding {
            AttributeBinding::Owning(attribute) => attribute
                .non_resident
                .as_ref()
                .and_then(|nr| nr.data_runs.get(index))
                .copied(),
            AttributeBinding::ListEntry(_) => None,
        }
    }

    /// The MFT record this attribute actually lives in, if this facade is
    /// bound through an `$ATTRIBUTE_LIST` entry. An `Owning` binding has no
    /// file reference of its own to report here; the owning record's
    /// identity is the caller's to track.
    pub fn file_reference(&self) -> Option<MftReference> {
        match &self.binding {
            AttributeBinding::Owning(_) => None,
            AttributeBinding::ListEntry(entry) => Some(entry.segment_reference.clone()),
        }
    }

    /// Materializes (and caches) this attribute's typed value. Only
    /// supported for an `Owning` binding; a `ListEntry` binding must first be
    /// resolved to the MFT record it points at by the caller. The cache
    /// remembers whichever `flags` the first successful call used, so an
    /// `MFT_ONLY` read followed by a full read (or vice versa) on the same
    /// facade returns the first call's value rather than re-materializing.
    pub fn value<D: ReadSeek>(
        &self,
        device: &mut D,
        geometry: ClusterGeometry,
        flags: ReadFlags,
    ) -> Result<AttributeValue> {
        {
            let guard = self.value.read().expect("lock not poisoned");
            match &*guard {
                LazyValue::Ready(v) => return Ok(v.clone()),
                LazyValue::Failed(msg) => return err::Internal { detail: msg.clone() }.fail(),
                LazyValue::NotYet => {}
            }
        }

        let mut guard = self.value.write().expect("lock not poisoned");
        // Another thread may have materialized (or failed) this value while
        // we were waiting for the write lock.
        match &*guard {
            LazyValue::Ready(v) => return Ok(v.clone()),
            LazyValue::Failed(msg) => return err::Internal { detail: msg.clone() }.fail(),
            LazyValue::NotYet => {}
        }

        let attribute = match &self.binding {
            AttributeBinding::Owning(attribute) => *attribute,
            AttributeBinding::ListEntry(_) => {
                return err::InvalidArgument {
                    detail: "cannot materialize a value through an attribute-list binding; \
                             resolve the referenced MFT record first"
                        .to_string(),
                }
                .fail();
            }
        };

        match orchestrator::materialize(attribute, device, geometry, flags) {
            Ok(value) => {
                *guard = LazyValue::Ready(value.clone());
                Ok(value)
            }
            Err(e) => {
                let msg = e.to_string();
                *guard = LazyValue::Failed(msg);
                Err(e)
            }
        }
    }
}
