pub enum Logger {
    DevNull,
    CommandLine(Verbosity),
}

impl Logger {
    pub fn log(&self, message: &str) {
        match self {
            Logger::DevNull => {}
            Logger::CommandLine(verbosity) => {
                if !matches!(verbosity, Verbosity::Quiet) {
                    println!("{}", message);
                }
            }
        }
    }

    pub fn log_debug(&self, message: &str) {
        if self.can_log_debug() {
            println!("{}", message);
        }
    }

    pub fn can_log_debug(&self) -> bool {
        match self {
            Logger::DevNull => false,
            Logger::CommandLine(verbosity) => matches!(verbosity, Verbosity::Debugging),
        }
    }

    pub fn get_verbosity(&self) -> Verbosity {
        match self {
            Logger::DevNull => Verbosity::Quiet,
            Logger::CommandLine(verbosity) => *verbosity,
        }
    }
}

#[derive(Copy, Clone)]
pub enum Verbosity {
    Quiet,
    Simple,
    Debugging,
}
