//! 线缆帧格式
//!
//! 每条消息由 12 字节消息头和消息体组成（小端）：
//!
//! ```text
//! offset  size  field
//! 0       1     消息类型（0x01 Call / 0x81 Reply / 0xFF Fault）
//! 1       1     flags（保留，0）
//! 2       2     reserved（0）
//! 4       4     序列号
//! 8       4     消息体长度
//! ```
//!
//! - Call 消息体：`u16` 方法名长度 + 方法名（UTF-8）+ 参数元组（bincode）
//! - Reply 消息体：返回值（bincode）
//! - Fault 消息体：远端错误信息（UTF-8）

use crate::RpcError;
use bytes::{BufMut, BytesMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::io::{self, Read, Write};
use thiserror::Error;

/// 消息头长度
pub const HEADER_LEN: usize = 12;

/// 消息体长度上限（256 MiB）
pub const MAX_BODY_LEN: usize = 256 * 1024 * 1024;

// ============================================================================
// Message Types
// ============================================================================

/// 消息类型
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum MessageType {
    // 客户端 → 远端
    Call = 0x01,

    // 远端 → 客户端
    Reply = 0x81,
    Fault = 0xFF,
}

// ============================================================================
// Frame Error
// ============================================================================

/// 帧格式错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("Invalid message type: 0x{0:02X}")]
    InvalidMessageType(u8),

    #[error("Frame body too large: {0} bytes (max 256 MiB)")]
    BodyTooLarge(usize),

    #[error("Invalid method name: {0}")]
    InvalidMethodName(String),

    #[error("Invalid fault message encoding")]
    InvalidFaultMessage,
}

// ============================================================================
// Frame Header
// ============================================================================

/// 消息头（12 字节）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub msg_type: MessageType,
    pub flags: u8,
    pub reserved: u16,
    pub seq: u32,
    pub length: u32,
}

impl FrameHeader {
    pub fn new(msg_type: MessageType, seq: u32, length: u32) -> Self {
        Self {
            msg_type,
            flags: 0,
            reserved: 0,
            seq,
            length,
        }
    }

    /// 编码消息头（追加 12 字节）
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.msg_type.into());
        buf.put_u8(self.flags);
        buf.put_u16_le(self.reserved);
        buf.put_u32_le(self.seq);
        buf.put_u32_le(self.length);
    }

    /// 从缓冲区解码消息头
    pub fn decode(buf: &[u8]) -> Result<Self, FrameError> {
        if buf.len() < HEADER_LEN {
            return Err(FrameError::TooShort {
                expected: HEADER_LEN,
                actual: buf.len(),
            });
        }

        let msg_type = MessageType::try_from_primitive(buf[0])
            .map_err(|e| FrameError::InvalidMessageType(e.number))?;
        let length = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
        if length as usize > MAX_BODY_LEN {
            return Err(FrameError::BodyTooLarge(length as usize));
        }

        Ok(Self {
            msg_type,
            flags: buf[1],
            reserved: u16::from_le_bytes([buf[2], buf[3]]),
            seq: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            length,
        })
    }
}

// ============================================================================
// Message
// ============================================================================

/// 完整消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// 远程调用（参数为 bincode 编码的位置参数元组）
    Call { method: String, params: Vec<u8> },
    /// 调用结果（bincode 编码）
    Reply(Vec<u8>),
    /// 远端错误
    Fault(String),
}

impl Message {
    pub fn msg_type(&self) -> MessageType {
        match self {
            Message::Call { .. } => MessageType::Call,
            Message::Reply(_) => MessageType::Reply,
            Message::Fault(_) => MessageType::Fault,
        }
    }

    /// 编码为完整帧（消息头 + 消息体）
    pub fn encode(&self, seq: u32) -> Result<BytesMut, FrameError> {
        let body_len = match self {
            Message::Call { method, params } => {
                if method.is_empty() || method.len() > u16::MAX as usize {
                    return Err(FrameError::InvalidMethodName(method.clone()));
                }
                2 + method.len() + params.len()
            },
            Message::Reply(data) => data.len(),
            Message::Fault(message) => message.len(),
        };
        if body_len > MAX_BODY_LEN {
            return Err(FrameError::BodyTooLarge(body_len));
        }

        let mut buf = BytesMut::with_capacity(HEADER_LEN + body_len);
        FrameHeader::new(self.msg_type(), seq, body_len as u32).encode(&mut buf);
        match self {
            Message::Call { method, params } => {
                buf.put_u16_le(method.len() as u16);
                buf.put_slice(method.as_bytes());
                buf.put_slice(params);
            },
            Message::Reply(data) => buf.put_slice(data),
            Message::Fault(message) => buf.put_slice(message.as_bytes()),
        }
        Ok(buf)
    }

    /// 按消息类型解码消息体
    pub fn decode_body(msg_type: MessageType, body: Vec<u8>) -> Result<Self, FrameError> {
        match msg_type {
            MessageType::Call => {
                if body.len() < 2 {
                    return Err(FrameError::TooShort {
                        expected: 2,
                        actual: body.len(),
                    });
                }
                let name_len = u16::from_le_bytes([body[0], body[1]]) as usize;
                if body.len() < 2 + name_len {
                    return Err(FrameError::TooShort {
                        expected: 2 + name_len,
                        actual: body.len(),
                    });
                }
                let method = std::str::from_utf8(&body[2..2 + name_len])
                    .map_err(|_| {
                        FrameError::InvalidMethodName(
                            String::from_utf8_lossy(&body[2..2 + name_len]).into_owned(),
                        )
                    })?
                    .to_string();
                if method.is_empty() {
                    return Err(FrameError::InvalidMethodName(method));
                }
                Ok(Message::Call {
                    method,
                    params: body[2 + name_len..].to_vec(),
                })
            },
            MessageType::Reply => Ok(Message::Reply(body)),
            MessageType::Fault => String::from_utf8(body)
                .map(Message::Fault)
                .map_err(|_| FrameError::InvalidFaultMessage),
        }
    }
}

/// 写出一条消息
pub fn write_message<W: Write>(writer: &mut W, seq: u32, message: &Message) -> Result<(), RpcError> {
    let frame = message.encode(seq)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// 读取一条消息，返回 `(seq, message)`
///
/// 对端有序关闭（读到 EOF）时返回 [`RpcError::ConnectionClosed`]。
pub fn read_message<R: Read>(reader: &mut R) -> Result<(u32, Message), RpcError> {
    let mut header_buf = [0u8; HEADER_LEN];
    read_exact_or_closed(reader, &mut header_buf)?;
    let header = FrameHeader::decode(&header_buf)?;

    let mut body = vec![0u8; header.length as usize];
    read_exact_or_closed(reader, &mut body)?;
    let message = Message::decode_body(header.msg_type, body)?;
    Ok((header.seq, message))
}

fn read_exact_or_closed<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), RpcError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => RpcError::ConnectionClosed,
        _ => RpcError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_layout() {
        let mut buf = BytesMut::new();
        FrameHeader::new(MessageType::Reply, 0x0102_0304, 16).encode(&mut buf);
        assert_eq!(buf.len(), HEADER_LEN);
        assert_eq!(buf[0], 0x81);
        assert_eq!(&buf[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&buf[8..12], &16u32.to_le_bytes());

        let header = FrameHeader::decode(&buf).unwrap();
        assert_eq!(header.msg_type, MessageType::Reply);
        assert_eq!(header.seq, 0x0102_0304);
        assert_eq!(header.length, 16);
    }

    #[test]
    fn test_header_too_short() {
        assert_eq!(
            FrameHeader::decode(&[0x01; 5]),
            Err(FrameError::TooShort {
                expected: HEADER_LEN,
                actual: 5
            })
        );
    }

    #[test]
    fn test_header_invalid_type() {
        let mut buf = [0u8; HEADER_LEN];
        buf[0] = 0x42;
        assert_eq!(
            FrameHeader::decode(&buf),
            Err(FrameError::InvalidMessageType(0x42))
        );
    }

    #[test]
    fn test_header_body_too_large() {
        let mut buf = BytesMut::new();
        FrameHeader::new(MessageType::Reply, 1, (MAX_BODY_LEN + 1) as u32).encode(&mut buf);
        assert!(matches!(
            FrameHeader::decode(&buf),
            Err(FrameError::BodyTooLarge(_))
        ));
    }

    #[test]
    fn test_call_message_over_stream() {
        let message = Message::Call {
            method: "simSetPose".to_string(),
            params: vec![1, 2, 3],
        };
        let mut stream = Vec::new();
        write_message(&mut stream, 7, &message).unwrap();
        assert_eq!(stream.len(), HEADER_LEN + 2 + "simSetPose".len() + 3);

        let (seq, decoded) = read_message(&mut Cursor::new(stream)).unwrap();
        assert_eq!(seq, 7);
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_call_without_params() {
        let message = Message::Call {
            method: "ping".to_string(),
            params: Vec::new(),
        };
        let frame = message.encode(1).unwrap();
        let (_, decoded) = read_message(&mut Cursor::new(frame.to_vec())).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_empty_method_rejected() {
        let message = Message::Call {
            method: String::new(),
            params: Vec::new(),
        };
        assert!(matches!(
            message.encode(1),
            Err(FrameError::InvalidMethodName(_))
        ));
    }

    #[test]
    fn test_fault_message() {
        let frame = Message::Fault("camera 9 not found".to_string()).encode(3).unwrap();
        assert_eq!(frame[0], 0xFF);
        let (seq, decoded) = read_message(&mut Cursor::new(frame.to_vec())).unwrap();
        assert_eq!(seq, 3);
        assert_eq!(decoded, Message::Fault("camera 9 not found".to_string()));
    }

    #[test]
    fn test_truncated_stream_is_closed() {
        let frame = Message::Reply(vec![9; 32]).encode(1).unwrap();
        let truncated = frame[..HEADER_LEN + 10].to_vec();
        assert!(matches!(
            read_message(&mut Cursor::new(truncated)),
            Err(RpcError::ConnectionClosed)
        ));
        assert!(matches!(
            read_message(&mut Cursor::new(Vec::new())),
            Err(RpcError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_call_body_name_overflow() {
        // 方法名长度超出消息体
        let body = vec![10, 0, b'a'];
        assert!(matches!(
            Message::decode_body(MessageType::Call, body),
            Err(FrameError::TooShort { .. })
        ));
    }
}
