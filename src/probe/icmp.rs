//! ICMP echo prober.
//!
//! Runs a bounded ping session against one host using `surge-ping`.

use std::net::IpAddr;
use std::time::Duration;

use socket2::Type;
use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};
use tokio::task::JoinSet;
use tokio::time::{Instant, Interval, timeout_at};

use super::stats::Statistics;
use super::traits::{ProbeError, Prober};
use crate::config::ProbeConfig;

/// Echo payload size in bytes, matching the classic `ping` default.
const PAYLOAD_SIZE: usize = 56;

const PAYLOAD: [u8; PAYLOAD_SIZE] = [0; PAYLOAD_SIZE];

/// ICMP echo prober backed by `surge-ping`.
///
/// A new client is created for each round so that socket errors (e.g. a
/// missing `CAP_NET_RAW`) surface as that round's error.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcmpProber;

impl IcmpProber {
    pub fn new() -> Self {
        Self
    }
}

/// Resolve hostname to IP address.
async fn resolve_host(host: &str) -> Result<IpAddr, std::io::Error> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let addrs = tokio::net::lookup_host(format!("{host}:0")).await?;
    addrs
        .into_iter()
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"))
}

/// Paces echo requests: up to `count` of them, one per `interval`, none at or
/// after `deadline`.
#[derive(Debug)]
struct SendSchedule {
    count: usize,
    sent: usize,
    ticker: Interval,
    deadline: Instant,
}

impl SendSchedule {
    fn new(count: usize, interval: Duration, deadline: Instant) -> Self {
        Self {
            count,
            sent: 0,
            ticker: tokio::time::interval(interval),
            deadline,
        }
    }

    /// Wait for the next send slot and return its sequence number.
    async fn next(&mut self) -> Option<u16> {
        if self.sent >= self.count {
            return None;
        }
        let seq = u16::try_from(self.sent).ok()?;
        timeout_at(self.deadline, self.ticker.tick()).await.ok()?;
        if Instant::now() >= self.deadline {
            return None;
        }
        self.sent += 1;
        Some(seq)
    }

    fn sent(&self) -> usize {
        self.sent
    }
}

fn client_config(ip: IpAddr, privileged: bool) -> Config {
    let kind = match ip {
        IpAddr::V4(_) => ICMP::V4,
        IpAddr::V6(_) => ICMP::V6,
    };
    let sock_type = if privileged { Type::RAW } else { Type::DGRAM };
    Config::builder().kind(kind).sock_type_hint(sock_type).build()
}

#[async_trait::async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, address: &str, config: &ProbeConfig) -> Result<Statistics, ProbeError> {
        let deadline = Instant::now() + config.timeout;

        let ip = match timeout_at(deadline, resolve_host(address)).await {
            Ok(resolved) => resolved,
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "resolution timed out",
            )),
        }
        .map_err(|source| ProbeError::Resolve {
            host: address.to_string(),
            source,
        })?;

        let client = Client::new(&client_config(ip, config.privileged)).map_err(ProbeError::Socket)?;
        let ident = PingIdentifier(rand::random());

        tracing::trace!(addr = %address, ip = %ip, count = config.count, "Starting ping session");

        // Replies are awaited concurrently so a slow reply never delays the next
        // request.
        let mut replies = JoinSet::new();
        let mut schedule = SendSchedule::new(config.count, config.interval, deadline);
        while let Some(seq) = schedule.next().await {
            let mut pinger = client.pinger(ip, ident).await;
            pinger.timeout(deadline.saturating_duration_since(Instant::now()));
            replies.spawn(async move { pinger.ping(PingSequence(seq), &PAYLOAD).await });
        }
        let sent = schedule.sent();

        let mut rtts = Vec::with_capacity(sent);
        loop {
            match timeout_at(deadline, replies.join_next()).await {
                Err(_) | Ok(None) => break,
                Ok(Some(Ok(Ok((_, rtt))))) => rtts.push(rtt),
                Ok(Some(Ok(Err(SurgeError::Timeout { seq })))) => {
                    tracing::trace!(addr = %address, seq = seq.0, "Echo request timed out");
                }
                Ok(Some(Ok(Err(e)))) => return Err(ProbeError::Execution(e.to_string())),
                Ok(Some(Err(e))) => return Err(ProbeError::Execution(e.to_string())),
            }
        }

        // Requests still pending at the deadline are dropped with the JoinSet
        // and counted as lost.
        Ok(Statistics::from_rtts(sent, &rtts))
    }
}
