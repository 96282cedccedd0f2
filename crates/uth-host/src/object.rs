/// Per-object bookkeeping the host keeps for every object it owns.
///
/// `rooted` exempts the object from collection. `pending_kill` means the
/// object is logically dead: outstanding handles must treat it as invalid,
/// but its memory stays around until the next sweep.
#[derive(Debug, Default)]
pub struct ObjectHeader {
    rooted: bool,
    pending_kill: bool,
}

impl ObjectHeader {
    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    pub fn add_to_root(&mut self) {
        assert!(
            !self.pending_kill,
            "cannot root an object that is pending destruction"
        );
        self.rooted = true;
    }

    pub fn remove_from_root(&mut self) {
        self.rooted = false;
    }

    pub fn is_pending_kill(&self) -> bool {
        self.pending_kill
    }

    /// Schedule the object for reclamation on the next sweep.
    ///
    /// The object must not be rooted; a rooted object would never be swept.
    pub fn mark_pending_kill(&mut self) {
        assert!(
            !self.rooted,
            "object must be removed from root before it is marked pending kill"
        );
        self.pending_kill = true;
    }
}

/// Implemented by every type the host arena can own.
pub trait HostObject {
    fn header(&self) -> &ObjectHeader;
    fn header_mut(&mut self) -> &mut ObjectHeader;
}
