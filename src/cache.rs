//! A small bounded cache of decoded cluster-sized blocks in front of a
//! [`crate::stream::ClusterBlockStream`]. `$BITMAP` and non-resident
//! `$SECURITY_DESCRIPTOR` materialization walk a stream cluster by cluster;
//! this avoids re-touching the device (and, for a compressed stream,
//! re-decompressing the same unit) on repeated access to the same cluster.
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::err::Result;
use crate::stream::{ClusterBlockStream, ClusterGeometry};
use crate::ReadSeek;

/// Default bound on how many decoded clusters are kept alive at once.
/// Callers materializing a single attribute front-to-back rarely benefit
/// from holding more than the block they're currently looking at.
const DEFAULT_CAPACITY: usize = 1;

pub struct ClusterBlockCache<'a, D: ReadSeek> {
    stream: ClusterBlockStream<'a, D>,
    geometry: ClusterGeometry,
    cache: LruCache<u64, Vec<u8>>,
}

impl<'a, D: ReadSeek> ClusterBlockCache<'a, D> {
    pub fn new(stream: ClusterBlockStream<'a, D>, geometry: ClusterGeometry) -> Self {
        Self::with_capacity(stream, geometry, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(
        stream: ClusterBlockStream<'a, D>,
        geometry: ClusterGeometry,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity.max(1) is never zero");
        ClusterBlockCache {
            stream,
            geometry,
            cache: LruCache::new(capacity),
        }
    }

    /// Returns the cluster-sized block at `cluster_index`, decoding (and, if
    /// the cache is already full, evicting the least-recently-used block)
    /// on first access.
    pub fn block(&mut self, cluster_index: u64) -> Result<&[u8]> {
        if !self.cache.contains(&cluster_index) {
            let cluster_size = self.geometry.cluster_size();
            let offset = cluster_index * cluster_size;
            let mut buf = vec![0_u8; cluster_size as usize];
            self.stream.read_at(offset, &mut buf)?;
            self.cache.put(cluster_index, buf);
        }
        Ok(self
            .cache
            .get(&cluster_index)
            .expect("just inserted or already present")
            .as_slice())
    }

    /// Number of clusters backing the underlying stream's logical length,
    /// rounding the final partial cluster up.
    pub fn len_in_clusters(&self) -> u64 {
        let cluster_size = self.geometry.cluster_size();
        (self.stream.len() + cluster_size - 1) / cluster_size
    }
}
