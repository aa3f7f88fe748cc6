use crate::world::position::CellIndex;

/// Follow-on instruction attached to a staged write. The scheduler acts on
/// it when the write is flushed, so a resolver can hand off behaviour to the
/// next tick instead of recursing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsArgs {
    /// The check created for the written cell carries the wait flag.
    Wait,
    /// The written cell turns to air with `chance`% probability on each
    /// dispatch, whatever its material.
    Dissipate { chance: u8 },
    /// Also schedule checks for the written cell's six neighbours.
    NotifyNeighbours,
}

/// Per-cell state carried between dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckData {
    /// Resolver-owned payload byte. Its meaning depends on the material.
    pub value: u8,
    /// Keeps a liquid check alive after it has finished spreading.
    pub wait: bool,
    /// Set for transient cells created with [`PhysicsArgs::Dissipate`].
    pub dissipate: Option<u8>,
}

impl CheckData {
    /// Reserved payload value: the check is retired after this dispatch.
    pub const RETIRE: u8 = 0xFF;

    pub const fn new(value: u8) -> Self {
        Self {
            value,
            wait: false,
            dissipate: None,
        }
    }

    /// Initial state for a check created by flushing a write with `args`.
    pub fn from_args(args: Option<PhysicsArgs>) -> Self {
        let mut data = Self::default();
        match args {
            Some(PhysicsArgs::Wait) => data.wait = true,
            Some(PhysicsArgs::Dissipate { chance }) => data.dissipate = Some(chance),
            Some(PhysicsArgs::NotifyNeighbours) | None => {}
        }
        data
    }

    #[inline]
    pub fn retire(&mut self) {
        self.value = Self::RETIRE;
    }

    #[inline]
    pub const fn is_retired(&self) -> bool {
        self.value == Self::RETIRE
    }
}

/// A queued unit of pending physics evaluation bound to one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    pub index: CellIndex,
    pub data: CheckData,
}

impl Check {
    pub const fn new(index: CellIndex) -> Self {
        Self {
            index,
            data: CheckData::new(0),
        }
    }

    pub const fn with_data(index: CellIndex, data: CheckData) -> Self {
        Self { index, data }
    }
}
