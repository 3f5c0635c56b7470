use tracing::level_filters::LevelFilter;

/// Options controlling how an inventory is loaded and reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Lower-cases every host and group name after parsing.
    ///
    /// Variable files are then looked up by their lower-cased names too.
    pub lowercase: bool,
    /// Loads `group_vars/` and `host_vars/` next to the inventory file.
    pub load_vars: bool,
    pub quiet: u8,
    pub verbose: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lowercase: true,
            load_vars: true,
            quiet: 0,
            verbose: 0,
        }
    }
}

impl Config {
    /// Maps the quiet/verbose counters onto a log level, `WARN` being the default.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose as i16 - self.quiet as i16 {
            i16::MIN..=-2 => LevelFilter::OFF,
            -1 => LevelFilter::ERROR,
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
