//! Runtime environment detection.
//!
//! The environment decides how streamed and binary responses are handed back:
//! a server process gets raw bytes, a browser host gets object URLs. It is
//! detected once, when the [`LlmRequest`](crate::LlmRequest) is built, through
//! an [`EnvironmentProbe`] supplied by the caller or the [`TargetProbe`]
//! default.

use std::fmt;

/// The host a client instance runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuntimeEnvironment {
    /// Neither a browser nor a server process could be identified.
    #[default]
    Unknown,
    /// A server-side process.
    Server,
    /// A browser (window-bearing) host.
    Browser,
}

impl RuntimeEnvironment {
    /// Whether this is `Server` or `Browser`.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Lowercase name, used in log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Server => "server",
            Self::Browser => "browser",
        }
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy that decides which [`RuntimeEnvironment`] the client runs in.
///
/// Called exactly once per client construction; the answer is fixed for the
/// lifetime of that client.
pub trait EnvironmentProbe {
    /// Detect the current runtime environment.
    fn detect(&self) -> RuntimeEnvironment;
}

/// A fixed environment probes as itself.
impl EnvironmentProbe for RuntimeEnvironment {
    fn detect(&self) -> RuntimeEnvironment {
        *self
    }
}

/// Explicit description of the host's globals.
///
/// A window-like global wins over a process-like global, so a bundled test
/// runner that exposes both is treated as a browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalsProbe {
    /// A window-like global object is present.
    pub window: bool,
    /// Version string of a process-like global, if one is present.
    pub process_version: Option<String>,
}

impl GlobalsProbe {
    /// Globals with neither a window nor a process.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a window-like global as present.
    #[must_use]
    pub const fn with_window(mut self) -> Self {
        self.window = true;
        self
    }

    /// Record a process-like global with the given version string.
    #[must_use]
    pub fn with_process_version(mut self, version: impl Into<String>) -> Self {
        self.process_version = Some(version.into());
        self
    }
}

impl EnvironmentProbe for GlobalsProbe {
    fn detect(&self) -> RuntimeEnvironment {
        if self.window {
            RuntimeEnvironment::Browser
        } else if self.process_version.is_some() {
            RuntimeEnvironment::Server
        } else {
            RuntimeEnvironment::Unknown
        }
    }
}

/// Default probe, derived from the compilation target.
///
/// `wasm32-unknown-*` builds run inside a JS host and are treated as a
/// browser; `unix` and `windows` builds are server processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetProbe;

impl TargetProbe {
    /// The globals this compilation target implies.
    #[must_use]
    pub fn globals(&self) -> GlobalsProbe {
        let mut globals = GlobalsProbe::new();
        if cfg!(all(target_arch = "wasm32", target_os = "unknown")) {
            globals = globals.with_window();
        }
        if cfg!(any(unix, windows)) {
            globals = globals.with_process_version(env!("CARGO_PKG_VERSION"));
        }
        globals
    }
}

impl EnvironmentProbe for TargetProbe {
    fn detect(&self) -> RuntimeEnvironment {
        self.globals().detect()
    }
}
