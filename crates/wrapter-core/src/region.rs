//! Closed catalog of region codes recognized as path anchors.
//!
//! The environment segment sits directly above the region segment, and the
//! region vocabulary is the only fixed one in the tree, so the catalog is what
//! lets the resolver find the environment at any nesting depth. Supporting a
//! new region means adding it here.

pub const REGIONS: &[&str] = &["us-east-1", "us-west-2", "eu-central-1"];

/// Exact, case-sensitive membership test.
pub fn is_region(segment: &str) -> bool {
    REGIONS.contains(&segment)
}
