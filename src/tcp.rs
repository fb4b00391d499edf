// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! TCP transport implementation

extern crate byteorder;

use super::constant::{FrameKind, ETX, MAX_DATA_SIZE, MAX_FRAME_SIZE};
use super::error::Error;
use super::transport::Transport as PackTrait;
use byteorder::{BigEndian, ByteOrder};
use log::{debug, trace};
use std::io::{Read, Write};
use std::net::{IpAddr, TcpStream};
use std::sync::Mutex;
use std::time::Duration;

/// Default TCP timeout
pub const TIMEOUT: Duration = Duration::from_secs(10);

const PPTP_HEADER_SIZE: usize = 5;

pub struct Transport {
    options: Options,
    stream: Mutex<TcpStream>,
}

/// a set of options for the TCP connection
#[derive(Debug, Clone)]
pub struct Options {
    pub connection_timeout: Option<Duration>,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    address: String,
    /// The frame format spoken on this connection. Determines how response
    /// frames are recovered from the stream.
    pub frame_kind: FrameKind,
}

impl Options {
    pub fn new(address: IpAddr, port: u16, frame_kind: FrameKind) -> Options {
        Options {
            connection_timeout: None,
            read_timeout: TIMEOUT,
            write_timeout: TIMEOUT,
            address: format!("{}:{}", address, port),
            frame_kind,
        }
    }
}

impl Transport {
    pub fn connect(options: Options) -> Result<Transport, Error> {
        let tcp_client = match options.connection_timeout {
            Some(timeout) => match options.address.parse::<std::net::SocketAddr>() {
                Ok(socket_address) => TcpStream::connect_timeout(&socket_address, timeout)?,
                Err(e) => return Err(Error::Connect(e.to_string())),
            },
            None => TcpStream::connect(&options.address)?,
        };

        tcp_client.set_read_timeout(Some(options.read_timeout))?;
        tcp_client.set_write_timeout(Some(options.write_timeout))?;

        debug!("connected to {}", options.address);

        Ok(Transport {
            options,
            stream: Mutex::new(tcp_client),
        })
    }

    // One UoPTB frame: everything up to and including the ETX delimiter.
    // Reserved bytes never appear inside the stuffed body, so the first
    // ETX terminates the frame.
    fn read_uptb(stream: &mut TcpStream) -> Result<Vec<u8>, Error> {
        let mut frame = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            stream.read_exact(&mut byte)?;
            frame.push(byte[0]);

            if byte[0] == ETX {
                return Ok(frame);
            }
            if frame.len() >= MAX_FRAME_SIZE {
                return Err(Error::BadFrame {
                    reason: "no ETX within the frame ceiling",
                });
            }
        }
    }

    // One PPTP frame: the header declares the payload length.
    fn read_pptp(stream: &mut TcpStream) -> Result<Vec<u8>, Error> {
        let mut frame = vec![0u8; PPTP_HEADER_SIZE];
        stream.read_exact(&mut frame)?;

        let dlen = BigEndian::read_u16(&frame[0..2]) as usize;
        if dlen > MAX_DATA_SIZE {
            return Err(Error::BadFrame {
                reason: "payload exceeds the data ceiling",
            });
        }

        frame.resize(PPTP_HEADER_SIZE + dlen, 0);
        stream.read_exact(&mut frame[PPTP_HEADER_SIZE..])?;
        Ok(frame)
    }
}

impl PackTrait for Transport {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, Error> {
        // Without delimiters there is no way to recover frames from the
        // byte stream.
        if self.options.frame_kind == FrameKind::UptbNoStx {
            return Err(Error::InvalidArgument {
                reason: "UoPTB without delimiters cannot be framed on a stream".to_string(),
            });
        }

        let mut stream = match self.stream.lock() {
            Ok(s) => s,
            Err(_) => return Err(Error::Lock),
        };

        stream.write_all(request)?;
        debug!("sent {} byte frame", request.len());
        trace!("tx: {:02X?}", request);

        let response = match self.options.frame_kind {
            FrameKind::Uptb => Transport::read_uptb(&mut stream)?,
            _ => Transport::read_pptp(&mut stream)?,
        };

        debug!("received {} byte frame", response.len());
        trace!("rx: {:02X?}", response);

        Ok(response)
    }
}
