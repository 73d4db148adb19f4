//! Utilities to handle signals.

use std::borrow::Cow;

use libc::c_int;

mod handler;
mod info;
mod set;
mod stream;

pub(crate) use handler::{SignalHandler, SignalHandlerBehavior};
pub(crate) use set::SignalSet;
pub(crate) use stream::{register_handlers, SignalStream};

pub(crate) type SignalNumber = c_int;

macro_rules! define_consts {
    ($($signal:ident,)*) => {
        pub(crate) mod consts {
            pub(crate) use libc::{$($signal,)*};
        }

        pub(crate) fn signal_name(signal: SignalNumber) -> Cow<'static, str> {
            match signal {
                $(consts::$signal => stringify!($signal).into(),)*
                _ => format!("unknown signal #{signal}").into(),
            }
        }
    };
}

define_consts! {
    SIGINT,
    SIGTSTP,
    SIGCHLD,
    SIGKILL,
    SIGSTOP,
}
