//! Wire frames of the discovery protocol.
//!
//! All frames are positional: there are no length prefixes or tags, so every
//! field lives at a fixed byte offset.

use std::fmt::Display;
use std::fmt::Formatter;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// First 3 bytes of every hardware address of the device family.
pub const VENDOR_PREFIX: [u8; 3] = [0x00, 0x08, 0xE1];

const DISCOVERY_PROBE: [u8; 5] = [0x81, 0x88, 0x53, 0x81, 0x01];
const SET_IP_PREFIX: [u8; 5] = [0x81, 0x88, 0x53, 0x81, 0x02];

const REPLY_MAC_OFFSET: usize = 5;
const REPLY_IP_OFFSET: usize = REPLY_MAC_OFFSET + MAC_LENGTH;
const REPLY_MIN_LENGTH: usize = REPLY_IP_OFFSET + 4;

const MAC_LENGTH: usize = 6;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct MacAddress([u8; MAC_LENGTH]);

impl MacAddress {
    pub const fn new(octets: [u8; MAC_LENGTH]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; MAC_LENGTH] {
        self.0
    }

    pub fn has_vendor_prefix(&self) -> bool {
        self.0.starts_with(&VENDOR_PREFIX)
    }
}

impl TryFrom<&[u8]> for MacAddress {
    type Error = CodecError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let octets: [u8; MAC_LENGTH] = value
            .try_into()
            .map_err(|_| CodecError::MacLength(value.len()))?;
        Ok(Self(octets))
    }
}

impl FromStr for MacAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octets = s
            .trim()
            .split([':', '-'])
            .map(|part| {
                if part.len() == 2 && part.bytes().all(|b| b.is_ascii_hexdigit()) {
                    u8::from_str_radix(part, 16).map_err(|_| CodecError::MacSyntax(s.into()))
                } else {
                    Err(CodecError::MacSyntax(s.into()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        octets.as_slice().try_into()
    }
}

impl Display for MacAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a, b, c, d, e, g
        )
    }
}

pub fn encode_discovery_probe() -> [u8; 5] {
    DISCOVERY_PROBE
}

/// Extracts the hardware address and IPv4 address from a discovery reply.
///
/// Returns `None` for frames that are too short or come from another vendor.
/// Only the first 15 bytes are interpreted.
pub fn decode_discovery_reply(buf: &[u8]) -> Option<(MacAddress, Ipv4Addr)> {
    if buf.len() < REPLY_MIN_LENGTH {
        log::debug!("Dropping a reply of {} bytes", buf.len());
        return None;
    }
    let mac = MacAddress::try_from(&buf[REPLY_MAC_OFFSET..REPLY_IP_OFFSET]).ok()?;
    if !mac.has_vendor_prefix() {
        log::debug!("Dropping a reply from foreign hardware address {}", mac);
        return None;
    }
    let ip: [u8; 4] = buf[REPLY_IP_OFFSET..REPLY_MIN_LENGTH].try_into().ok()?;
    Some((mac, ip.into()))
}

pub fn encode_set_ip_command(mac: &[u8], ip: Ipv4Addr) -> Result<Vec<u8>, CodecError> {
    let mac = MacAddress::try_from(mac)?;
    let mut frame = Vec::with_capacity(SET_IP_PREFIX.len() + MAC_LENGTH + 4);
    frame.extend_from_slice(&SET_IP_PREFIX);
    frame.extend_from_slice(&mac.octets());
    frame.extend_from_slice(&ip.octets());
    Ok(frame)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Hardware address must be 6 bytes long, got {0}")]
    MacLength(usize),

    #[error("Invalid hardware address `{0}`")]
    MacSyntax(String),
}

#[cfg(test)]
pub(crate) fn encode_discovery_reply(mac: MacAddress, ip: Ipv4Addr) -> Vec<u8> {
    let mut frame = vec![0; REPLY_MAC_OFFSET];
    frame.extend_from_slice(&mac.octets());
    frame.extend_from_slice(&ip.octets());
    frame
}

#[cfg(test)]
mod test {
    use super::*;

    const MAC: MacAddress = MacAddress::new([0x00, 0x08, 0xE1, 0x12, 0x34, 0x56]);

    #[test]
    fn decode_reply() {
        let frame = [
            0x81, 0x88, 0x53, 0x81, 0x01, 0x00, 0x08, 0xE1, 0xAA, 0xBB, 0xCC, 0xC0, 0xA8, 0x01,
            0x0A,
        ];

        // When
        let reply = decode_discovery_reply(&frame);

        // Then
        let expected_mac = MacAddress::new([0x00, 0x08, 0xE1, 0xAA, 0xBB, 0xCC]);
        assert_eq!(reply, Some((expected_mac, Ipv4Addr::new(192, 168, 1, 10))));
    }

    #[test]
    fn decode_encoded_reply() {
        let ip = Ipv4Addr::new(10, 1, 2, 3);
        let frame = encode_discovery_reply(MAC, ip);
        assert_eq!(decode_discovery_reply(&frame), Some((MAC, ip)));
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let ip = Ipv4Addr::new(172, 16, 0, 1);
        let mut frame = encode_discovery_reply(MAC, ip);
        frame.extend_from_slice(&[0xFF; 32]);
        assert_eq!(decode_discovery_reply(&frame), Some((MAC, ip)));
    }

    #[test]
    fn decode_short_reply() {
        let frame = encode_discovery_reply(MAC, Ipv4Addr::LOCALHOST);
        for length in 0..frame.len() {
            assert_eq!(decode_discovery_reply(&frame[..length]), None);
        }
        assert_eq!(decode_discovery_reply(&[0x00, 0x08, 0xE1]), None);
    }

    #[test]
    fn decode_foreign_vendor() {
        for index in 0..VENDOR_PREFIX.len() {
            let mut octets = MAC.octets();
            octets[index] ^= 0xFF;
            let frame = encode_discovery_reply(MacAddress::new(octets), Ipv4Addr::LOCALHOST);
            assert_eq!(decode_discovery_reply(&frame), None);
        }
    }

    #[test]
    fn decode_probe_echo() {
        assert_eq!(decode_discovery_reply(&encode_discovery_probe()), None);
    }

    #[test]
    fn set_ip_command() {
        let mac = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];

        // When
        let frame = encode_set_ip_command(&mac, Ipv4Addr::new(10, 0, 0, 5)).unwrap();

        // Then
        let expected_frame = [
            0x81, 0x88, 0x53, 0x81, 0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x0A, 0x00, 0x00,
            0x05,
        ];
        assert_eq!(frame, expected_frame);
    }

    #[test]
    fn set_ip_command_mac_length_mismatch() {
        let e = encode_set_ip_command(&[0xAA, 0xBB], Ipv4Addr::LOCALHOST).unwrap_err();
        assert_eq!(e, CodecError::MacLength(2));

        let e = encode_set_ip_command(&[0; 7], Ipv4Addr::LOCALHOST).unwrap_err();
        assert_eq!(e, CodecError::MacLength(7));
    }

    #[test]
    fn display_mac() {
        assert_eq!(MAC.to_string(), "00:08:E1:12:34:56");
    }

    #[test]
    fn parse_mac() {
        assert_eq!("00:08:e1:12:34:56".parse(), Ok(MAC));
        assert_eq!("00-08-E1-12-34-56".parse(), Ok(MAC));
    }

    #[test]
    fn parse_invalid_mac() {
        let inputs = [
            "",
            "00:08:E1:12:34",
            "00:08:E1:12:34:56:78",
            "00:08:E1:12:34:5G",
            "0008E1123456",
            "00:08:E1:12:34:+6",
        ];
        for input in inputs {
            let result: Result<MacAddress, _> = input.parse();
            assert!(result.is_err(), "`{}` must be rejected", input);
        }
    }
}
