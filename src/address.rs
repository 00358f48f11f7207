//! Sound server addresses.
//!
//! PulseAudio servers are addressed by strings such as `tcp:audio:4317` or
//! `unix:/run/pulse/native`. [`Address`] parses these into a typed form
//! that a protocol client can connect to, and formats them back in
//! canonical form.
//!
//! # Accepted Forms
//!
//! * `tcp:host:port` and `tcp:[ipv6]:port`
//! * `tcp:host` (default port 4713)
//! * `unix:/path/to/socket` or a bare absolute path
//! * a bare `host` or `host:port`, taken as TCP

use std::{fmt, net::Ipv6Addr, path::PathBuf, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::Error;

/// Address of a sound server.
#[derive(Clone, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Address {
    /// Native protocol over TCP.
    Tcp { host: String, port: u16 },
    /// Native protocol over a Unix domain socket.
    Unix(PathBuf),
}

impl Address {
    /// Port the PulseAudio native protocol listens on unless told otherwise.
    pub const DEFAULT_PORT: u16 = 4713;

    const TCP_PREFIX: &'static str = "tcp:";
    const UNIX_PREFIX: &'static str = "unix:";

    fn parse_tcp(s: &str) -> Result<Self, Error> {
        // Bracketed IPv6 literal with optional port.
        if let Some(rest) = s.strip_prefix('[') {
            let (host, rest) = rest
                .split_once(']')
                .ok_or_else(|| Error::invalid_argument(format!("unterminated IPv6 address: {s}")))?;
            host.parse::<Ipv6Addr>()?;

            let port = match rest.strip_prefix(':') {
                Some(port) => port.parse()?,
                None if rest.is_empty() => Self::DEFAULT_PORT,
                None => {
                    return Err(Error::invalid_argument(format!(
                        "unexpected characters after IPv6 address: {rest}"
                    )))
                }
            };

            return Ok(Self::Tcp {
                host: host.to_owned(),
                port,
            });
        }

        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => (host, port.parse()?),
            None => (s, Self::DEFAULT_PORT),
        };

        if host.is_empty() || host.contains(':') {
            return Err(Error::invalid_argument(format!("invalid host: {s}")));
        }

        Ok(Self::Tcp {
            host: host.to_owned(),
            port,
        })
    }
}

impl Default for Address {
    /// The sound server of a balena audio block: `tcp:audio:4317`.
    fn default() -> Self {
        Self::Tcp {
            host: "audio".to_owned(),
            port: 4317,
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::invalid_argument("address is empty"));
        }

        if let Some(path) = s.strip_prefix(Self::UNIX_PREFIX) {
            if path.is_empty() {
                return Err(Error::invalid_argument("socket path is empty"));
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }

        if s.starts_with('/') {
            return Ok(Self::Unix(PathBuf::from(s)));
        }

        Self::parse_tcp(s.strip_prefix(Self::TCP_PREFIX).unwrap_or(s))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } if host.contains(':') => {
                write!(f, "{}[{host}]:{port}", Self::TCP_PREFIX)
            }
            Self::Tcp { host, port } => write!(f, "{}{host}:{port}", Self::TCP_PREFIX),
            Self::Unix(path) => write!(f, "{}{}", Self::UNIX_PREFIX, path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn default_is_audio_block() {
        assert_eq!(Address::default().to_string(), "tcp:audio:4317");
        assert_eq!("tcp:audio:4317".parse::<Address>().unwrap(), Address::default());
    }

    #[test]
    fn parses_tcp_forms() {
        assert_eq!(
            "tcp:localhost".parse::<Address>().unwrap(),
            Address::Tcp {
                host: "localhost".to_owned(),
                port: Address::DEFAULT_PORT
            }
        );
        assert_eq!(
            "192.168.1.10:4713".parse::<Address>().unwrap(),
            Address::Tcp {
                host: "192.168.1.10".to_owned(),
                port: 4713
            }
        );

        let v6 = "tcp:[::1]:4713".parse::<Address>().unwrap();
        assert_eq!(
            v6,
            Address::Tcp {
                host: "::1".to_owned(),
                port: 4713
            }
        );
        assert_eq!(v6.to_string(), "tcp:[::1]:4713");
    }

    #[test]
    fn parses_unix_forms() {
        let expected = Address::Unix(PathBuf::from("/run/pulse/native"));
        assert_eq!("unix:/run/pulse/native".parse::<Address>().unwrap(), expected);
        assert_eq!("/run/pulse/native".parse::<Address>().unwrap(), expected);
        assert_eq!(expected.to_string(), "unix:/run/pulse/native");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for input in ["", "tcp:", "tcp:audio:port", "tcp:[::1", "tcp:[zz]:1", "unix:", "a:b:c"] {
            let err = input.parse::<Address>().unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument, "{input}");
        }
    }
}
