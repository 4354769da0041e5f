//! IPC Protocol definitions
//!
//! Requests and responses are protobuf messages. On the wire every message
//! is preceded by its encoded length as a little-endian `u32`:
//!
//! ```text
//! +----------------+---------------------------+
//! | len: u32 (LE)  | protobuf payload (len B)  |
//! +----------------+---------------------------+
//! ```
//!
//! One request and one response are exchanged per connection.

use std::collections::BTreeMap;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::IpcError;
use crate::model::{
    AnomalyDetection, FrrRouterData, InterfaceList, LsaList, NeighborList, NetworkConfig, PeerMap,
    RouteList, SystemMetrics,
};

/// Default cap on a single frame's payload
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024; // 1 MB
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// `Response::status` of a handled request
pub const STATUS_SUCCESS: &str = "success";
/// `Response::status` of a failed or unknown request
pub const STATUS_ERROR: &str = "error";

/// Request envelope
#[derive(Clone, PartialEq, prost::Message)]
pub struct Message {
    #[prost(string, tag = "1")]
    pub service: String,

    #[prost(string, tag = "2")]
    pub command: String,

    /// Command parameters. No current command reads them.
    #[prost(btree_map = "string, message", tag = "3")]
    pub params: BTreeMap<String, ParamValue>,
}

impl Message {
    /// Create a request without parameters
    pub fn new(service: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            command: command.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// A typed request parameter
#[derive(Clone, PartialEq, prost::Message)]
pub struct ParamValue {
    #[prost(oneof = "param_value::Kind", tags = "1, 2, 3, 4")]
    pub kind: Option<param_value::Kind>,
}

pub mod param_value {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(string, tag = "1")]
        StringValue(String),
        #[prost(int64, tag = "2")]
        IntValue(i64),
        #[prost(double, tag = "3")]
        DoubleValue(f64),
        #[prost(bool, tag = "4")]
        BoolValue(bool),
    }
}

impl ParamValue {
    /// Parse a command-line `value` into the narrowest matching kind
    ///
    /// `true`/`false` become booleans, integers and floats become numbers,
    /// anything else stays a string.
    pub fn parse(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            return b.into();
        }
        if let Ok(i) = raw.parse::<i64>() {
            return i.into();
        }
        if let Ok(f) = raw.parse::<f64>() {
            return f.into();
        }
        raw.into()
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self {
            kind: Some(param_value::Kind::StringValue(v)),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        v.to_string().into()
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self {
            kind: Some(param_value::Kind::IntValue(v)),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self {
            kind: Some(param_value::Kind::DoubleValue(v)),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self {
            kind: Some(param_value::Kind::BoolValue(v)),
        }
    }
}

/// Response envelope
#[derive(Clone, PartialEq, prost::Message)]
pub struct Response {
    /// [`STATUS_SUCCESS`] or [`STATUS_ERROR`]
    #[prost(string, tag = "1")]
    pub status: String,

    #[prost(string, tag = "2")]
    pub message: String,

    /// Absent for control commands and errors
    #[prost(message, optional, tag = "3")]
    pub data: Option<ResponseValue>,
}

impl Response {
    /// Successful response carrying `data`
    pub fn success(message: impl Into<String>, data: impl Into<ResponseValue>) -> Self {
        Self {
            status: STATUS_SUCCESS.into(),
            message: message.into(),
            data: Some(data.into()),
        }
    }

    /// Successful response without a payload
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Error response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.into(),
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Payload variant, if any
    pub fn kind(&self) -> Option<&response_value::Kind> {
        self.data.as_ref().and_then(|d| d.kind.as_ref())
    }
}

/// Typed response payload
#[derive(Clone, PartialEq, prost::Message)]
pub struct ResponseValue {
    #[prost(oneof = "response_value::Kind", tags = "1, 2, 3, 4, 5, 6, 7, 8, 9")]
    pub kind: Option<response_value::Kind>,
}

pub mod response_value {
    use crate::model::{
        AnomalyDetection, FrrRouterData, InterfaceList, LsaList, NeighborList, NetworkConfig,
        PeerMap, RouteList, SystemMetrics,
    };

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        RouterData(FrrRouterData),
        #[prost(message, tag = "2")]
        Lsas(LsaList),
        #[prost(message, tag = "3")]
        Neighbors(NeighborList),
        #[prost(message, tag = "4")]
        Interfaces(InterfaceList),
        #[prost(message, tag = "5")]
        Routes(RouteList),
        #[prost(message, tag = "6")]
        StaticConfig(NetworkConfig),
        #[prost(message, tag = "7")]
        PeerMap(PeerMap),
        #[prost(message, tag = "8")]
        Anomaly(AnomalyDetection),
        #[prost(message, tag = "9")]
        SystemMetrics(SystemMetrics),
    }
}

macro_rules! impl_response_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ResponseValue {
                fn from(v: $ty) -> Self {
                    Self {
                        kind: Some(response_value::Kind::$variant(v)),
                    }
                }
            }
        )*
    };
}

impl_response_value! {
    FrrRouterData => RouterData,
    LsaList => Lsas,
    NeighborList => Neighbors,
    InterfaceList => Interfaces,
    RouteList => Routes,
    NetworkConfig => StaticConfig,
    PeerMap => PeerMap,
    AnomalyDetection => Anomaly,
    SystemMetrics => SystemMetrics,
}

/// Encode a message with length prefix
///
/// # Errors
///
/// Returns `IpcError::FrameTooLarge` if the payload does not fit the
/// 4-byte length prefix.
pub fn encode_message<M: prost::Message>(msg: &M) -> Result<Vec<u8>, IpcError> {
    let payload_len = msg.encoded_len();
    let len = u32::try_from(payload_len).map_err(|_| IpcError::FrameTooLarge {
        size: payload_len,
        max: u32::MAX as usize,
    })?;

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload_len);
    buf.extend_from_slice(&len.to_le_bytes());
    msg.encode(&mut buf)?;

    Ok(buf)
}

/// Decode a frame payload (without its length prefix)
///
/// # Errors
///
/// Returns `IpcError::ProtocolError` if the bytes are not a valid message.
pub fn decode_message<M: prost::Message + Default>(data: &[u8]) -> Result<M, IpcError> {
    Ok(M::decode(data)?)
}

/// Read one length-prefixed frame
///
/// # Errors
///
/// A stream that ends inside the header or the payload is a protocol
/// error, as is a declared length above `max_size`.
pub async fn read_frame<R>(reader: &mut R, max_size: usize) -> Result<Vec<u8>, IpcError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; LENGTH_PREFIX_SIZE];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| short_read(e, "length prefix"))?;

    let msg_len = u32::from_le_bytes(len_buf) as usize;
    if msg_len > max_size {
        return Err(IpcError::FrameTooLarge {
            size: msg_len,
            max: max_size,
        });
    }

    let mut msg_buf = vec![0u8; msg_len];
    reader
        .read_exact(&mut msg_buf)
        .await
        .map_err(|e| short_read(e, "payload"))?;

    Ok(msg_buf)
}

/// Encode `msg` and write it as one frame
///
/// # Errors
///
/// Returns `IpcError` if encoding or the write fails.
pub async fn write_frame<W, M>(writer: &mut W, msg: &M) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin,
    M: prost::Message,
{
    let encoded = encode_message(msg)?;
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}

fn short_read(e: std::io::Error, part: &str) -> IpcError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        IpcError::protocol(format!("connection closed while reading {part}"))
    } else {
        IpcError::from(e)
    }
}
