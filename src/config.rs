//! Configuration for pstore
//!
//! Centralized configuration with sensible defaults.

/// Main configuration for a PersistentStore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Range Configuration
    // -------------------------------------------------------------------------
    /// First managed address (inclusive). `None` means the medium start.
    pub begin: Option<u16>,

    /// Last managed address (exclusive). `None` means the medium end.
    pub end: Option<u16>,

    // -------------------------------------------------------------------------
    // Write Configuration
    // -------------------------------------------------------------------------
    /// Call `Medium::commit` at the end of every mutating operation
    pub auto_commit: bool,

    // -------------------------------------------------------------------------
    // Reconciliation Configuration
    // -------------------------------------------------------------------------
    /// Force a full rewrite when a desired key is found stored with another size
    pub rewrite_on_resize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            begin: None,
            end: None,
            auto_commit: true,
            rewrite_on_resize: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the managed range `[begin, end)`
    pub fn range(mut self, begin: u16, end: u16) -> Self {
        self.config.begin = Some(begin);
        self.config.end = Some(end);
        self
    }

    /// Set the first managed address
    pub fn begin(mut self, begin: u16) -> Self {
        self.config.begin = Some(begin);
        self
    }

    /// Set the end of the managed range (exclusive)
    pub fn end(mut self, end: u16) -> Self {
        self.config.end = Some(end);
        self
    }

    /// Enable or disable committing after each mutating operation
    pub fn auto_commit(mut self, enabled: bool) -> Self {
        self.config.auto_commit = enabled;
        self
    }

    /// Enable or disable rewriting the store when a key changed size
    pub fn rewrite_on_resize(mut self, enabled: bool) -> Self {
        self.config.rewrite_on_resize = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
