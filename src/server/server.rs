use super::router::Router;
use crate::channel::Channel;
use crate::protocol::{Request, Response};
use crate::Result;
use tracing::{debug, info};

use actix::Addr;

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Implements a server for handling incoming connections.
pub struct Server {
    listener: TcpListener,
    /// The address of the router.
    router: Addr<Router>,
}

impl Server {
    pub async fn bind(ip: SocketAddr, router: Addr<Router>) -> Result<Server> {
        let listener = TcpListener::bind(ip).await?;
        Ok(Server { listener, router })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves connections until `shutdown` is cancelled.
    pub async fn listen(self, shutdown: CancellationToken) -> Result<()> {
        info!("listening on {:?}", self.local_addr()?);
        loop {
            let (channel, peer) = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("stopped listening");
                    return Ok(());
                }
                accepted = Channel::<Response, Request>::accept(&self.listener) => accepted?,
            };
            let router = self.router.clone();
            tokio::spawn(async move {
                if let Err(err) = serve(channel, router).await {
                    debug!("failed to serve {:?}: {}", peer, err);
                }
            });
        }
    }
}

/// Answers the single request carried by a connection.
async fn serve(channel: Channel<Response, Request>, router: Addr<Router>) -> Result<()> {
    let (mut sender, mut receiver) = channel.split();
    match receiver.recv().await? {
        Some(request) => {
            let response = router.send(request).await?;
            sender.send(response).await?;
        }
        None => debug!("connection closed before a request was received"),
    }
    Ok(())
}
