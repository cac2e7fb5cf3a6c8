//! Length-delimited, `bincode` encoded request / response channels over TCP.
//!
//! A `Channel<I, O>` sends values of type `I` and receives values of type `O`, so the two ends
//! of a connection use mirrored types, e.g. `Channel<Request, Response>` on the client and
//! `Channel<Response, Request>` on the server.

use futures::prelude::*;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio_serde::formats::*;
use tokio_serde::Framed;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

#[derive(Debug)]
pub enum Error {
    IO(std::io::Error),
    Read(std::io::Error),
    Write(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub type Reader<I, O> =
    Framed<FramedRead<OwnedReadHalf, LengthDelimitedCodec>, O, I, Bincode<O, I>>;

pub type Writer<I, O> =
    Framed<FramedWrite<OwnedWriteHalf, LengthDelimitedCodec>, O, I, Bincode<O, I>>;

pub struct Receiver<I, O> {
    reader: Reader<I, O>,
}

impl<I, O> Receiver<I, O>
where
    I: Serialize + Unpin,
    O: for<'de> Deserialize<'de> + Unpin,
{
    /// Receives the next value, `None` once the peer closed the connection.
    pub async fn recv(&mut self) -> Result<Option<O>> {
        self.reader.try_next().await.map_err(Error::Read)
    }
}

pub struct Sender<I, O> {
    writer: Writer<I, O>,
}

impl<I, O> Sender<I, O>
where
    I: Serialize + Unpin,
    O: for<'de> Deserialize<'de> + Unpin,
{
    pub async fn send(&mut self, item: I) -> Result<()> {
        self.writer.send(item).await.map_err(Error::Write)
    }
}

pub struct Channel<I, O> {
    sender: Sender<I, O>,
    receiver: Receiver<I, O>,
}

impl<I, O> Channel<I, O>
where
    I: Serialize + Unpin,
    O: for<'de> Deserialize<'de> + Unpin,
{
    pub async fn connect(address: &SocketAddr) -> Result<Channel<I, O>> {
        let socket = TcpStream::connect(address).await.map_err(Error::IO)?;
        Ok(Channel::wrap(socket))
    }

    /// Accepts the next connection, returning the channel and the address of the peer.
    pub async fn accept(listener: &TcpListener) -> Result<(Channel<I, O>, SocketAddr)> {
        let (socket, peer) = listener.accept().await.map_err(Error::IO)?;
        Ok((Channel::wrap(socket), peer))
    }

    pub fn wrap(socket: TcpStream) -> Channel<I, O> {
        let (reader, writer) = socket.into_split();

        let reader = FramedRead::new(reader, LengthDelimitedCodec::new());
        let reader = Framed::new(reader, Bincode::default());

        let writer = FramedWrite::new(writer, LengthDelimitedCodec::new());
        let writer = Framed::new(writer, Bincode::default());

        Channel { sender: Sender { writer }, receiver: Receiver { reader } }
    }

    pub fn split(self) -> (Sender<I, O>, Receiver<I, O>) {
        (self.sender, self.receiver)
    }
}
