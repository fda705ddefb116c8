//! In-memory camera for exercising the pipeline without hardware.
//!
//! Models the misbehaviours seen on real UVC cameras: values clamped to a
//! range, writes that silently land as a different value until the
//! register is bounced, and controls that fail to read or write.

use crate::device::{ControlDevice, DeviceError, DeviceOpener};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Default)]
struct SimState {
    registers: BTreeMap<u32, i64>,
    clamps: BTreeMap<u32, (i64, i64)>,
    /// cid -> (writes left, value they land as)
    sticky: BTreeMap<u32, (usize, i64)>,
    write_failures: HashSet<u32>,
    read_failures: HashSet<u32>,
    fail_open: bool,
    writes: Vec<(u32, i64)>,
    opened: Vec<PathBuf>,
    live_handles: usize,
}

/// Shared simulated camera. Clones observe the same registers.
#[derive(Clone, Default)]
pub struct SimCamera {
    state: Rc<RefCell<SimState>>,
}

impl SimCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a register, as if the driver default were `value`.
    pub fn with_value(self, cid: u32, value: i64) -> Self {
        self.state.borrow_mut().registers.insert(cid, value);
        self
    }

    /// Silently clamp every write to `cid` into `[min, max]`.
    pub fn clamp(self, cid: u32, min: i64, max: i64) -> Self {
        self.state.borrow_mut().clamps.insert(cid, (min, max));
        self
    }

    /// The first `count` writes to `cid` land as `value` instead.
    pub fn stick_first_writes(self, cid: u32, count: usize, value: i64) -> Self {
        self.state.borrow_mut().sticky.insert(cid, (count, value));
        self
    }

    pub fn fail_writes(self, cid: u32) -> Self {
        self.state.borrow_mut().write_failures.insert(cid);
        self
    }

    pub fn fail_reads(self, cid: u32) -> Self {
        self.state.borrow_mut().read_failures.insert(cid);
        self
    }

    pub fn fail_open(self) -> Self {
        self.state.borrow_mut().fail_open = true;
        self
    }

    /// Current register value.
    pub fn value(&self, cid: u32) -> Option<i64> {
        self.state.borrow().registers.get(&cid).copied()
    }

    /// Every accepted write, in order.
    pub fn writes(&self) -> Vec<(u32, i64)> {
        self.state.borrow().writes.clone()
    }

    /// Writes to one control, in order.
    pub fn writes_to(&self, cid: u32) -> Vec<i64> {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|(c, _)| *c == cid)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Paths passed to each successful `open`.
    pub fn opened(&self) -> Vec<PathBuf> {
        self.state.borrow().opened.clone()
    }

    /// Handles currently open.
    pub fn live_handles(&self) -> usize {
        self.state.borrow().live_handles
    }
}

impl DeviceOpener for SimCamera {
    type Device = SimHandle;

    fn open(&self, path: &Path) -> Result<SimHandle, DeviceError> {
        let mut state = self.state.borrow_mut();
        if state.fail_open {
            return Err(DeviceError::NotFound(path.display().to_string()));
        }
        state.opened.push(path.to_path_buf());
        state.live_handles += 1;
        Ok(SimHandle {
            state: Rc::clone(&self.state),
        })
    }
}

/// One open handle on a [`SimCamera`].
pub struct SimHandle {
    state: Rc<RefCell<SimState>>,
}

impl ControlDevice for SimHandle {
    fn set_control(&mut self, cid: u32, value: i64) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.write_failures.contains(&cid) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "EINVAL"));
        }
        state.writes.push((cid, value));

        let mut landed = value;
        if let Some((left, stuck)) = state.sticky.get_mut(&cid) {
            if *left > 0 {
                *left -= 1;
                landed = *stuck;
            }
        }
        if let Some(&(min, max)) = state.clamps.get(&cid) {
            landed = landed.clamp(min, max);
        }
        state.registers.insert(cid, landed);
        Ok(())
    }

    fn get_control(&mut self, cid: u32) -> io::Result<i64> {
        let state = self.state.borrow();
        if state.read_failures.contains(&cid) {
            return Err(io::Error::new(io::ErrorKind::Other, "EIO"));
        }
        state
            .registers
            .get(&cid)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Unsupported, "control not supported"))
    }
}

impl Drop for SimHandle {
    fn drop(&mut self) {
        self.state.borrow_mut().live_handles -= 1;
    }
}
