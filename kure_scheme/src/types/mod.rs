//! Typed representations of the GitOps controller custom resources Kure
//! emits. These are not installed against a live apiserver (Kure never
//! connects to a cluster) — they exist purely so the Scheme Registry and
//! Serializer can treat GitOps objects the same way they treat native
//! Kubernetes types, with a known Rust shape instead of a free-form map.

pub mod argocd;
pub mod flux;
