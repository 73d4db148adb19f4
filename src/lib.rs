pub(crate) mod builtins;
pub(crate) mod cutils;
pub(crate) mod exec;
pub(crate) mod log;
pub(crate) mod session;
pub(crate) mod signals;
pub(crate) mod system;
pub(crate) mod tokenize;

mod shell;

pub use shell::main as shell_main;
