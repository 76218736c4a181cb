use serde::Serialize;

use crate::attribute::raw::RawAttribute;
use crate::attribute::x10::StandardInfoAttr;
use crate::attribute::x100::LoggedUtilityStreamAttr;
use crate::attribute::x30::FileNameAttr;
use crate::attribute::x40::ObjectIdAttr;
use crate::attribute::x50::SecurityDescriptorAttr;
use crate::attribute::x60::VolumeNameAttr;
use crate::attribute::x70::VolumeInformationAttr;
use crate::attribute::xb0::BitmapAttr;
use crate::attribute::xc0::ReparsePointAttr;

/// The materialized value of an attribute, as produced by
/// [`crate::orchestrator`]. Each variant corresponds to one of the typed C5
/// parsers; attribute types this crate doesn't decode a schema for (`DATA`,
/// `ATTRIBUTE_LIST`, `INDEX_ROOT`, `INDEX_ALLOCATION`, and anything unknown)
/// surface as `Raw`.
#[derive(Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum AttributeValue {
    StandardInformation(StandardInfoAttr),
    FileName(FileNameAttr),
    ObjectId(ObjectIdAttr),
    SecurityDescriptor(SecurityDescriptorAttr),
    VolumeName(VolumeNameAttr),
    VolumeInformation(VolumeInformationAttr),
    Bitmap(BitmapAttr),
    ReparsePoint(ReparsePointAttr),
    LoggedUtilityStream(LoggedUtilityStreamAttr),
    Raw(RawAttribute),
}
