/// Arena index into [`crate::Cluster`]'s node list. Kept as a plain index
/// rather than `Rc`/`Weak` so a Node's parent back-reference can never form
/// an ownership cycle: the arena owns every Node, indices only borrow.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) usize);

/// Arena index into [`crate::Cluster`]'s bundle list.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BundleId(pub(crate) usize);
