//! Contract creation lookup over a result-limited `eth_getLogs` upstream.
//!
//! A contract's creation transaction is the transaction of its oldest event log.
//! [`resolver::ContractResolver`] finds it with [`search::find_oldest_logs`], which
//! bisects the block range whenever the upstream reports too many results.

pub mod cli;
pub mod logging;
pub mod resolver;
pub mod rpc;
pub mod search;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_utils;
