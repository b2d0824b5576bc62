use crate::error::{Error, Result};

/// Upper bound on kernel enumeration inherited from the classic fixed-size
/// kernel table. Programs declaring more kernels are truncated (with a
/// warning), never rejected.
pub const DEFAULT_KERNEL_ENUM_CAP: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of kernels enumerated per program during compilation
    /// and name listing. Enumeration past this bound is clipped.
    pub max_enumerated_kernels: usize,

    /// Local work size requested for workgroup-generic compilation.
    /// `[0, 0, 0]` asks the code generator for an unspecialized variant.
    pub generic_local_size: [usize; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_enumerated_kernels: DEFAULT_KERNEL_ENUM_CAP,
            generic_local_size: [0, 0, 0],
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_enumerated_kernels == 0 {
            return Err(Error::config("max_enumerated_kernels must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn max_enumerated_kernels(mut self, cap: usize) -> Self {
        self.config.max_enumerated_kernels = cap;
        self
    }

    pub fn generic_local_size(mut self, local: [usize; 3]) -> Self {
        self.config.generic_local_size = local;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
