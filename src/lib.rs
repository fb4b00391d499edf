// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! This crate provides communication tools for Aesys variable message sign
//! devices speaking the Modular Extensible Protocol (MEP)
//!
//! The codec is synchronous and stateless: builders produce complete
//! request frames, parsers consume complete response frames. The bundled
//! TCP transport carries one transaction at a time; any other transport
//! can be plugged in through the [`transport::Transport`] trait.
//!
//! # Examples
//! ```no_run
//! # use mep::{message, response, tcp, transport::Transport};
//! # use mep::constant::FrameKind;
//! # use std::net::{IpAddr, Ipv4Addr};
//! # use std::time::Duration;
//!
//! # fn main() {
//!     let addr = Ipv4Addr::new(192, 168, 0, 30);
//!     let mut opts = tcp::Options::new(IpAddr::from(addr), 9100, FrameKind::Uptb);
//!     opts.read_timeout = Duration::from_secs(2);
//!     opts.write_timeout = Duration::from_secs(2);
//!
//!     let mut conn = match tcp::Transport::connect(opts) {
//!         Ok(conn) => conn,
//!         Err(e) => {
//!             println!("{:?}", e.to_string());
//!             return;
//!         }
//!     };
//!
//!     let request = message::build_temp_info(FrameKind::Uptb, 0x0001, 0).unwrap();
//!
//!     match conn.send(&request) {
//!         Ok(frame) => match response::parse_response(&frame, FrameKind::Uptb) {
//!             Ok(resp) => {
//!                 for item in resp.items.iter() {
//!                     println!("code {:#06X}: {:?}", item.code, item.value());
//!                 }
//!             }
//!             Err(e) => println!("bad response: {}", e),
//!         },
//!         Err(e) => println!("send failed: {}", e),
//!     }
//! # }
//! ```
pub mod command;
pub mod constant;
pub mod error;
pub mod frame;
pub mod layout;
pub mod message;
pub mod registry;
pub mod response;
pub mod tcp;
pub mod transport;
