// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Filter;
use crate::description::Description;
use xxhash_rust::xxh64::xxh64;

/// Runs only the tests that hash into one shard.
///
/// Each test is assigned to exactly one shard, so running every shard index for a fixed number
/// of shards runs every test exactly once.
#[derive(Clone, Debug)]
pub struct ShardingFilter {
    num_shards: u64,
    shard_index: u64,
}

impl ShardingFilter {
    /// Creates a new filter. `shard_index` counts up from 0 and must be less than `num_shards`.
    pub fn new(num_shards: u64, shard_index: u64) -> Self {
        debug_assert!(
            shard_index < num_shards,
            "shard index {shard_index} out of range for {num_shards} shards"
        );
        Self {
            num_shards,
            shard_index,
        }
    }

    /// Returns the shard that the named test belongs to.
    pub fn shard_for(&self, display_name: &str) -> u64 {
        // Fixed to xxhash64 so shard assignments are stable across runs and machines.
        xxh64(display_name.as_bytes(), 0) % self.num_shards
    }
}

impl Filter for ShardingFilter {
    // Suites are kept so that sharding applies to their children. A suite left with no children
    // is dropped when the filter is applied.
    fn should_run(&self, description: &Description) -> bool {
        !description.is_test() || self.evaluate_test(description)
    }

    fn evaluate_test(&self, description: &Description) -> bool {
        self.shard_for(description.display_name()) == self.shard_index
    }

    fn describe(&self) -> String {
        format!("Shard {} of {} shards", self.shard_index, self.num_shards)
    }
}
