//! Client-side view of the chat RPCs.
//!
//! [`ClientAgent`](super::ClientAgent) only talks to the server through
//! [`ChatTransport`]; [`GrpcChatTransport`] is the tonic implementation.

use futures::stream::BoxStream;
use futures::StreamExt;
#[cfg(test)]
use mockall::automock;
use tonic::async_trait;
use tonic::codec::CompressionEncoding;
use tonic::transport::Channel;
use tonic::transport::Endpoint;
use tracing::debug;

use crate::proto::ChatMessage;
use crate::proto::ChittyChatClient;
use crate::proto::JoinRequest;
use crate::proto::PublishAck;
use crate::utils::net::address_str;
use crate::ClientConfig;
use crate::ClockValue;
use crate::NetworkConfig;
use crate::NetworkError;
use crate::Result;

/// Inbound broadcasts of one `Join` call.
pub type MessageStream = BoxStream<'static, std::result::Result<ChatMessage, tonic::Status>>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    /// Opens the server-to-client stream for `identity`.
    async fn join(
        &self,
        identity: &str,
        lamport_clock: ClockValue,
    ) -> Result<MessageStream>;

    async fn publish(
        &self,
        message: ChatMessage,
    ) -> Result<PublishAck>;
}

#[derive(Clone, Debug)]
pub struct GrpcChatTransport {
    // Channel is reference-counted; every call works on a cheap clone.
    client: ChittyChatClient<Channel>,
}

impl GrpcChatTransport {
    pub async fn connect(
        config: &ClientConfig,
        network: &NetworkConfig,
    ) -> Result<Self> {
        let channel = Self::create_channel(address_str(&config.server_address), network).await?;

        let mut client = ChittyChatClient::new(channel);
        if network.enable_compression {
            client = client
                .send_compressed(CompressionEncoding::Gzip)
                .accept_compressed(CompressionEncoding::Gzip);
        }
        Ok(Self { client })
    }

    async fn create_channel(
        addr: String,
        network: &NetworkConfig,
    ) -> Result<Channel> {
        debug!("create_channel, addr = {:?}", &addr);
        let endpoint =
            Endpoint::try_from(addr.clone()).map_err(|_| NetworkError::InvalidURI(addr))?;
        endpoint
            .connect_timeout(network.connect_timeout())
            .timeout(network.request_timeout())
            .tcp_keepalive(Some(network.tcp_keepalive()))
            .tcp_nodelay(network.tcp_nodelay)
            .http2_keep_alive_interval(network.http2_keep_alive_interval())
            .keep_alive_timeout(network.http2_keep_alive_timeout())
            .connect()
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl ChatTransport for GrpcChatTransport {
    async fn join(
        &self,
        identity: &str,
        lamport_clock: ClockValue,
    ) -> Result<MessageStream> {
        let mut client = self.client.clone();
        let response = client
            .join(JoinRequest {
                sender: identity.to_string(),
                lamport_clock,
            })
            .await?;
        Ok(response.into_inner().boxed())
    }

    async fn publish(
        &self,
        message: ChatMessage,
    ) -> Result<PublishAck> {
        let mut client = self.client.clone();
        let response = client.publish(message).await?;
        Ok(response.into_inner())
    }
}
