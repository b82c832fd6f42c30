//! CPU pinning for timing measurements.
//!
//! On Linux the thread is pinned with `sched_setaffinity` and the previous
//! mask is restored when the guard is dropped. Elsewhere pinning is a no-op
//! and the guard reports itself as unpinned.

#[cfg(target_os = "linux")]
mod platform {
    pub type SavedAffinity = libc::cpu_set_t;

    pub fn current_cpu() -> Option<usize> {
        // SAFETY: sched_getcpu has no preconditions.
        let cpu = unsafe { libc::sched_getcpu() };
        (cpu >= 0).then_some(cpu as usize)
    }

    /// Pin to `core_id`, returning the mask that was active before.
    pub fn pin(core_id: usize) -> Option<SavedAffinity> {
        // SAFETY: cpu_set_t is plain data; the pointers passed are valid for the calls.
        unsafe {
            let mut original: libc::cpu_set_t = std::mem::zeroed();
            if libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut original) != 0 {
                return None;
            }

            let mut set: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(core_id, &mut set);
            if libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) != 0 {
                return None;
            }
            Some(original)
        }
    }

    pub fn restore(saved: &SavedAffinity) -> bool {
        // SAFETY: `saved` is a mask previously returned by sched_getaffinity.
        unsafe { libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), saved) == 0 }
    }
}

#[cfg(not(target_os = "linux"))]
mod platform {
    pub type SavedAffinity = ();

    pub fn current_cpu() -> Option<usize> {
        None
    }

    pub fn pin(_core_id: usize) -> Option<SavedAffinity> {
        None
    }

    pub fn restore(_saved: &SavedAffinity) -> bool {
        true
    }
}

/// RAII guard for CPU pinning - pins on creation, unpins on drop.
pub struct CpuPinGuard {
    pinned_core: Option<usize>,
    saved: Option<platform::SavedAffinity>,
}

impl CpuPinGuard {
    /// Pin the current thread to the core it is running on (core 0 if unknown).
    pub fn new() -> Self {
        let core = platform::current_cpu().unwrap_or(0);
        let saved = platform::pin(core);
        if saved.is_none() {
            tracing::trace!(core, "cpu pinning unavailable");
        }
        Self {
            pinned_core: saved.is_some().then_some(core),
            saved,
        }
    }

    /// Get the core ID this thread is pinned to, if any.
    pub fn core_id(&self) -> Option<usize> {
        self.pinned_core
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_core.is_some()
    }
}

impl Drop for CpuPinGuard {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            if !platform::restore(&saved) {
                tracing::debug!("failed to restore cpu affinity");
            }
        }
    }
}

impl Default for CpuPinGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_guard() {
        let guard = CpuPinGuard::new();
        if guard.is_pinned() {
            assert!(guard.core_id().is_some());
        }
        drop(guard);
    }

    #[test]
    fn test_nested_guards() {
        let outer = CpuPinGuard::new();
        {
            let inner = CpuPinGuard::new();
            assert_eq!(inner.is_pinned(), outer.is_pinned());
        }
        drop(outer);
        let again = CpuPinGuard::new();
        assert_eq!(again.is_pinned(), again.core_id().is_some());
    }
}
