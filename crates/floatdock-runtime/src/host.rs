#![forbid(unsafe_code)]

//! Host window capability.
//!
//! The engine decides where windows go; the host actually moves them. A
//! [`WindowHost`] receives the applied geometry, opacity, and pin state of
//! each window whenever the store changes them. Native shells forward these
//! to their windowing API; headless use plugs in [`DetachedHost`].

use core::convert::Infallible;
use core::fmt;

use floatdock_core::geometry::Rect;
use floatdock_layout::WindowId;

/// Output half of the host boundary.
///
/// Calls arrive only for values that changed since the last call for that
/// window. Errors are logged by the engine and never abort a gesture.
pub trait WindowHost {
    /// Platform-specific error type.
    type Error: fmt::Debug + fmt::Display;

    /// Reposition and resize a native window.
    fn apply_geometry(&mut self, window: WindowId, bounds: Rect) -> Result<(), Self::Error>;

    /// Set a native window's opacity in `[0, 1]`.
    fn apply_opacity(&mut self, window: WindowId, opacity: f64) -> Result<(), Self::Error>;

    /// Set or clear a native window's always-on-top level.
    fn apply_always_on_top(&mut self, window: WindowId, always_on_top: bool)
    -> Result<(), Self::Error>;

    /// Optional: the window was closed and its native resources may go.
    fn release(&mut self, _window: WindowId) {}
}

/// Host that drops every call. Used for headless engines and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetachedHost;

impl WindowHost for DetachedHost {
    type Error = Infallible;

    fn apply_geometry(&mut self, _window: WindowId, _bounds: Rect) -> Result<(), Self::Error> {
        Ok(())
    }

    fn apply_opacity(&mut self, _window: WindowId, _opacity: f64) -> Result<(), Self::Error> {
        Ok(())
    }

    fn apply_always_on_top(
        &mut self,
        _window: WindowId,
        _always_on_top: bool,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<H: WindowHost + ?Sized> WindowHost for &mut H {
    type Error = H::Error;

    fn apply_geometry(&mut self, window: WindowId, bounds: Rect) -> Result<(), Self::Error> {
        (**self).apply_geometry(window, bounds)
    }

    fn apply_opacity(&mut self, window: WindowId, opacity: f64) -> Result<(), Self::Error> {
        (**self).apply_opacity(window, opacity)
    }

    fn apply_always_on_top(
        &mut self,
        window: WindowId,
        always_on_top: bool,
    ) -> Result<(), Self::Error> {
        (**self).apply_always_on_top(window, always_on_top)
    }

    fn release(&mut self, window: WindowId) {
        (**self).release(window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestError(&'static str);

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "TestError: {}", self.0)
        }
    }

    #[derive(Default)]
    struct CountingHost {
        geometry: usize,
        released: Vec<WindowId>,
    }

    impl WindowHost for CountingHost {
        type Error = TestError;

        fn apply_geometry(&mut self, _window: WindowId, _bounds: Rect) -> Result<(), Self::Error> {
            self.geometry += 1;
            Ok(())
        }

        fn apply_opacity(&mut self, _window: WindowId, _opacity: f64) -> Result<(), Self::Error> {
            Err(TestError("opacity unsupported"))
        }

        fn apply_always_on_top(
            &mut self,
            _window: WindowId,
            _always_on_top: bool,
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn release(&mut self, window: WindowId) {
            self.released.push(window);
        }
    }

    #[test]
    fn detached_host_accepts_everything() {
        let mut host = DetachedHost;
        let id = WindowId::MIN;
        assert!(host.apply_geometry(id, Rect::new(0.0, 0.0, 1.0, 1.0)).is_ok());
        assert!(host.apply_opacity(id, 0.5).is_ok());
        assert!(host.apply_always_on_top(id, true).is_ok());
        host.release(id);
    }

    fn drive<H: WindowHost>(mut host: H) -> Option<String> {
        host.apply_geometry(WindowId::MIN, Rect::default()).ok()?;
        let err = host.apply_opacity(WindowId::MIN, 0.3).err().map(|e| e.to_string());
        host.release(WindowId::MIN);
        err
    }

    #[test]
    fn mut_ref_forwards_to_inner_host() {
        let mut inner = CountingHost::default();
        let err = drive(&mut inner);
        assert_eq!(err.as_deref(), Some("TestError: opacity unsupported"));
        assert_eq!(inner.geometry, 1);
        assert_eq!(inner.released, vec![WindowId::MIN]);
    }
}
