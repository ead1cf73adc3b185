//! Payload update semantics.
//!
//! The spec's `update_cb` — "called when an insertion targets a node
//! already carrying a payload (default replaces)" — is the C-with-void-
//! pointers way of asking for polymorphism over how two payloads combine.
//! Design Note 9 says the idiomatic Rust translation is a generic
//! parameter with a trait bound rather than a callback, so that's what
//! this is: the teacher's own `MergeUpdate` trait (`src/common.rs`,
//! implemented for `PrefixAs` by just overwriting the inner value) shows
//! the same shape — a trait with one method, implemented per payload type,
//! where "just overwrite" is the common case.

/// How a payload already stored at a key combines with a newly inserted
/// one. The default overwrites, matching the spec's default `update_cb`.
pub trait MergeUpdate: Sized {
    fn merge_update(&mut self, new: Self) {
        *self = new;
    }
}

impl MergeUpdate for () {}
impl MergeUpdate for bool {}
impl MergeUpdate for u8 {}
impl MergeUpdate for u16 {}
impl MergeUpdate for u32 {}
impl MergeUpdate for u64 {}
impl MergeUpdate for i32 {}
impl MergeUpdate for i64 {}
impl MergeUpdate for String {}
impl MergeUpdate for &'static str {}
