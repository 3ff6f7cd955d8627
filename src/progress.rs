//! Optional sink for human-readable progress lines.
//!
//! Workers and the dispatcher write through a shared handle; failures to write
//! are logged and otherwise ignored since nothing downstream depends on them.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct ProgressSink {
    out: Option<Arc<Mutex<Box<dyn Write + Send>>>>,
}

impl ProgressSink {
    /// A sink that drops everything
    pub fn discard() -> Self {
        Self::default()
    }

    pub fn new(writer: impl Write + Send + 'static) -> Self {
        ProgressSink {
            out: Some(Arc::new(Mutex::new(Box::new(writer)))),
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    pub fn is_enabled(&self) -> bool {
        self.out.is_some()
    }

    pub fn line(&self, args: fmt::Arguments<'_>) {
        let Some(out) = &self.out else {
            return;
        };
        let Ok(mut out) = out.lock() else {
            return;
        };
        if let Err(e) = out.write_fmt(args).and_then(|_| out.write_all(b"\n")) {
            log::debug!("progress sink write failed: {e}");
        }
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressSink")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Vec-backed writer that can be inspected after the sink is done with it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => String::new(),
        }
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "shared buffer poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
