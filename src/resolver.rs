//! Host to single-address resolution.
//!
//! Runs once per invocation, before any probe is sent. There is no cache: the
//! resolved address is fixed for the lifetime of the run.

use std::fmt;
use std::future::Future;
use std::io;
use std::net::{IpAddr, Ipv4Addr};

use log::debug;

use crate::error::TcpingError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressFamily {
    #[default]
    V4,
    V6,
}

impl AddressFamily {
    /// DNS record type name used in user-facing messages.
    pub fn record(self) -> &'static str {
        match self {
            AddressFamily::V4 => "A",
            AddressFamily::V6 => "AAAA",
        }
    }
}

/// How lookup candidates are matched against the requested family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FamilyMatch {
    /// IPv4 accepts anything with a 4-byte form, including IPv4-mapped IPv6
    /// (`::ffff:a.b.c.d`, reported in dotted form). IPv6 accepts only
    /// addresses without a 4-byte form.
    #[default]
    Compat,
    /// Only addresses of the literal requested family match.
    Strict,
}

/// Result of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The host was already an IP address and was used as-is.
    Literal(IpAddr),
    /// The host was looked up and this record was picked.
    Record { ip: IpAddr, family: AddressFamily },
}

impl Resolution {
    pub fn ip(&self) -> IpAddr {
        match *self {
            Resolution::Literal(ip) | Resolution::Record { ip, .. } => ip,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ip().fmt(f)
    }
}

fn four_byte_form(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

/// Pick the first candidate, in lookup order, that matches `family`.
pub fn select_candidate(candidates: &[IpAddr], family: AddressFamily, policy: FamilyMatch) -> Option<IpAddr> {
    candidates.iter().find_map(|&ip| match (policy, family) {
        (FamilyMatch::Compat, AddressFamily::V4) => four_byte_form(ip).map(IpAddr::V4),
        (FamilyMatch::Compat, AddressFamily::V6) => {
            (ip.is_ipv6() && four_byte_form(ip).is_none()).then_some(ip)
        }
        (FamilyMatch::Strict, AddressFamily::V4) => ip.is_ipv4().then_some(ip),
        (FamilyMatch::Strict, AddressFamily::V6) => ip.is_ipv6().then_some(ip),
    })
}

/// Forward lookup producing candidates in resolver order.
pub trait Lookup: Send + Sync {
    fn lookup(&self, host: &str) -> impl Future<Output = io::Result<Vec<IpAddr>>> + Send;
}

/// The system resolver, through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl Lookup for SystemLookup {
    fn lookup(&self, host: &str) -> impl Future<Output = io::Result<Vec<IpAddr>>> + Send {
        let host = host.to_string();
        async move {
            // port is irrelevant, lookup_host needs one
            let addrs = tokio::net::lookup_host((host.as_str(), 0)).await?;
            Ok(addrs.map(|addr| addr.ip()).collect())
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AddressResolver<L = SystemLookup> {
    policy: FamilyMatch,
    lookup: L,
}

impl AddressResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: FamilyMatch) -> Self {
        Self {
            policy,
            lookup: SystemLookup,
        }
    }
}

impl<L: Lookup> AddressResolver<L> {
    /// Swap the lookup backend, keeping the matching policy.
    pub fn with_lookup<M: Lookup>(self, lookup: M) -> AddressResolver<M> {
        AddressResolver {
            policy: self.policy,
            lookup,
        }
    }

    /// Resolve `host` to one address of `family`.
    ///
    /// A literal IP is returned unchanged and the family hint is ignored.
    pub async fn resolve(&self, host: &str, family: AddressFamily) -> Result<Resolution, TcpingError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(Resolution::Literal(ip));
        }

        let candidates = self
            .lookup
            .lookup(host)
            .await
            .map_err(|source| TcpingError::Resolution {
                host: host.to_string(),
                source,
            })?;
        debug!("{host} resolved to {candidates:?}");
        self.pick(host, &candidates, family)
    }

    /// Apply the selection policy to an already completed lookup.
    pub fn pick(&self, host: &str, candidates: &[IpAddr], family: AddressFamily) -> Result<Resolution, TcpingError> {
        let ip = select_candidate(candidates, family, self.policy).ok_or_else(|| {
            TcpingError::NoMatchingRecord {
                host: host.to_string(),
                record: family.record(),
            }
        })?;
        debug!("using {} record {ip} for {host}", family.record());
        Ok(Resolution::Record { ip, family })
    }
}
