//! WebSocket transport adapter
//!
//! Text and binary frames both become opaque messages and a close frame
//! reads as a clean end of stream. Outgoing messages are sent as text frames
//! when they are valid UTF-8 and as binary otherwise.

use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};

use crate::hub::{Message, TransportError, TransportReader, TransportWriter};

/// Read half of an upgraded socket
pub struct WsReader {
    stream: SplitStream<WebSocket>,
}

impl WsReader {
    pub fn new(stream: SplitStream<WebSocket>) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl TransportReader for WsReader {
    async fn read_message(&mut self) -> Result<Option<Message>, TransportError> {
        while let Some(frame) = self.stream.next().await {
            let frame = frame.map_err(|e| TransportError::Read(e.to_string()))?;
            match decode_frame(frame) {
                Frame::Data(message) => return Ok(Some(message)),
                Frame::Control => continue,
                Frame::Close => break,
            }
        }
        Ok(None)
    }
}

/// Write half of an upgraded socket
pub struct WsWriter {
    sink: SplitSink<WebSocket, WsMessage>,
}

impl WsWriter {
    pub fn new(sink: SplitSink<WebSocket, WsMessage>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl TransportWriter for WsWriter {
    async fn write_message(&mut self, message: Message) -> Result<(), TransportError> {
        self.sink
            .send(encode_frame(message))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .close()
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }
}

#[derive(Debug, PartialEq)]
enum Frame {
    Data(Message),
    Control,
    Close,
}

fn decode_frame(frame: WsMessage) -> Frame {
    match frame {
        WsMessage::Text(text) => Frame::Data(Message::from(text)),
        WsMessage::Binary(data) => Frame::Data(Message::from(data)),
        // Axum answers pings itself
        WsMessage::Ping(_) | WsMessage::Pong(_) => Frame::Control,
        WsMessage::Close(_) => Frame::Close,
    }
}

fn encode_frame(message: Message) -> WsMessage {
    let bytes = message.into_bytes();
    match std::str::from_utf8(&bytes) {
        Ok(text) => WsMessage::Text(text.to_owned()),
        Err(_) => WsMessage::Binary(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_binary_frames_decode() {
        let text = decode_frame(WsMessage::Text("hi".to_string()));
        assert_eq!(text, Frame::Data(Message::from("hi")));

        let binary = decode_frame(WsMessage::Binary(vec![0, 1, 2]));
        assert_eq!(binary, Frame::Data(Message::from(vec![0u8, 1, 2])));
    }

    #[test]
    fn test_control_and_close_frames() {
        assert_eq!(decode_frame(WsMessage::Ping(vec![1])), Frame::Control);
        assert_eq!(decode_frame(WsMessage::Pong(vec![1])), Frame::Control);
        assert_eq!(decode_frame(WsMessage::Close(None)), Frame::Close);
    }

    #[test]
    fn test_encode_picks_frame_kind() {
        assert!(matches!(
            encode_frame(Message::from("hello")),
            WsMessage::Text(t) if t == "hello"
        ));
        assert!(matches!(
            encode_frame(Message::from(vec![0xff, 0xfe])),
            WsMessage::Binary(b) if b == vec![0xff, 0xfe]
        ));
    }
}
