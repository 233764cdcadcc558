//! Direct no-recursion NS queries against a specific nameserver.
//!
//! A recursive resolver answers REFUSED (or nothing useful) for a subdomain whose
//! parent zone has not published the delegation yet, or when the parent's servers
//! are misbehaving. Asking one of the parent's own authoritative servers directly,
//! with recursion disabled, returns the delegation NS set in the authority section
//! of a referral, which is what proves where the subdomain points.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use hickory_resolver::proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_resolver::proto::rr::{Name, RData, RecordType};
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::error::{DnsError, DnsResult};
use crate::name::normalize_host;

/// Largest UDP response accepted.
const MAX_RESPONSE_LEN: usize = 4096;

/// Encode a single-question NS query with recursion disabled.
pub fn build_ns_query(domain: &str, id: u16) -> DnsResult<Vec<u8>> {
    let name = Name::from_str(&format!("{}.", normalize_host(domain)))
        .map_err(|e| DnsError::InvalidName(format!("{domain}: {e}")))?;

    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(false);
    message.add_query(Query::query(name, RecordType::NS));

    message
        .to_vec()
        .map_err(|e| DnsError::Network(format!("failed to encode query: {e}")))
}

/// Decode a response to [`build_ns_query`] and collect NS hostnames for `domain`.
///
/// NS records owned by `domain` are read from both the answer section (the
/// server is authoritative for it) and the authority section (a referral).
/// Hostnames come back lowercased without the trailing dot.
pub fn parse_ns_response(bytes: &[u8], domain: &str, expected_id: u16) -> DnsResult<Vec<String>> {
    let message = Message::from_vec(bytes)
        .map_err(|e| DnsError::Network(format!("malformed response: {e}")))?;

    if message.id() != expected_id {
        return Err(DnsError::Network(format!(
            "response id {} does not match query id {expected_id}",
            message.id()
        )));
    }

    match message.response_code() {
        ResponseCode::NoError => {}
        ResponseCode::NXDomain => return Err(DnsError::NotFound(domain.to_string())),
        ResponseCode::Refused => return Err(DnsError::Refused(domain.to_string())),
        other => return Err(DnsError::Network(format!("{domain}: {other}"))),
    }

    let owner = normalize_host(domain);
    let mut hosts: Vec<String> = Vec::new();
    for record in message.answers().iter().chain(message.name_servers()) {
        if normalize_host(&record.name().to_ascii()) != owner {
            continue;
        }
        if let RData::NS(ns) = record.data() {
            let host = normalize_host(&ns.0.to_ascii());
            if !hosts.contains(&host) {
                hosts.push(host);
            }
        }
    }
    Ok(hosts)
}

/// Send a no-recursion NS query for `domain` to `server:53` over UDP.
pub async fn query_delegated_ns(
    domain: &str,
    server: IpAddr,
    per_attempt: Duration,
) -> DnsResult<Vec<String>> {
    let id: u16 = rand::random();
    let query = build_ns_query(domain, id)?;

    let bind_addr = match server {
        IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    };
    let socket = UdpSocket::bind(bind_addr)
        .await
        .map_err(|e| DnsError::Network(e.to_string()))?;
    socket
        .connect(SocketAddr::new(server, 53))
        .await
        .map_err(|e| DnsError::Network(e.to_string()))?;
    socket
        .send(&query)
        .await
        .map_err(|e| DnsError::Network(e.to_string()))?;

    let mut buf = vec![0_u8; MAX_RESPONSE_LEN];
    let len = timeout(per_attempt, socket.recv(&mut buf))
        .await
        .map_err(|_| DnsError::Timeout(format!("{domain} @ {server}")))?
        .map_err(|e| DnsError::Network(e.to_string()))?;

    let hosts = parse_ns_response(&buf[..len], domain, id)?;
    log::debug!("Delegation query {domain} @ {server}: {hosts:?}");
    Ok(hosts)
}
