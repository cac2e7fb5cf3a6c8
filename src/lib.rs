#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate actix_derive;
extern crate colored;

pub mod beacons;
pub mod bootstrap;
pub mod channel;
pub mod choices;
pub mod client;
pub mod id;
pub mod protocol;
pub mod queue;
pub mod server;
pub mod storage;
pub mod util;
pub mod vertex;
pub mod vm;

#[derive(Debug)]
pub enum Error {
    IO(std::io::Error),
    Sled(sled::Error),
    Actix(actix::MailboxError),
    Config(String),

    // component errors
    Storage(storage::Error),
    Vm(vm::Error),
    Queue(queue::Error),
    Bootstrap(bootstrap::Error),

    // client errors
    InvalidResponse,
    Timeout,
    UnknownPeer(id::NodeId),

    // channel errors
    ChannelError(String),

    /// Error caused by converting from a `String` to an `Id`
    TryFromStringError,
    /// Error when parsing a peer description `ID@IP`
    PeerParseError,
}

impl std::error::Error for Error {}

impl std::convert::From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

impl std::convert::From<sled::Error> for Error {
    fn from(error: sled::Error) -> Self {
        Error::Sled(error)
    }
}

impl std::convert::From<actix::MailboxError> for Error {
    fn from(error: actix::MailboxError) -> Self {
        Error::Actix(error)
    }
}

impl std::convert::From<channel::Error> for Error {
    fn from(error: channel::Error) -> Self {
        match error {
            channel::Error::IO(io_err) => Error::IO(io_err),
            channel::Error::Read(err) => Error::ChannelError(format!("{:?}", err)),
            channel::Error::Write(err) => Error::ChannelError(format!("{:?}", err)),
        }
    }
}

impl std::convert::From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Error::Config(format!("{}", error))
    }
}

impl std::convert::From<storage::Error> for Error {
    fn from(error: storage::Error) -> Self {
        Error::Storage(error)
    }
}

impl std::convert::From<vm::Error> for Error {
    fn from(error: vm::Error) -> Self {
        Error::Vm(error)
    }
}

impl std::convert::From<queue::Error> for Error {
    fn from(error: queue::Error) -> Self {
        Error::Queue(error)
    }
}

impl std::convert::From<bootstrap::Error> for Error {
    fn from(error: bootstrap::Error) -> Self {
        Error::Bootstrap(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
