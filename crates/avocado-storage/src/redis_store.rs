use std::time::Duration;

use avocado_core::{KeyValueStore, RedisStoreConfig, StoreError};
use redis::{
    Client, Connection, ConnectionAddr, ConnectionInfo, ConnectionLike, RedisConnectionInfo,
    RedisError, Value,
};
use tracing::{debug, instrument};

/// Networked store backed by a Redis server. The key space is flat.
///
/// The `Client` handle is created once at configuration time and does not connect
/// until the first operation. Every connection is bounded by the configured timeout,
/// including the `AUTH`/`SELECT` handshake, so an unresponsive server fails the
/// operation instead of hanging it.
pub struct RedisStore {
    client: Client,
    password: Option<String>,
    db: i64,
    timeout: Duration,
}

impl RedisStore {
    pub fn connect(config: &RedisStoreConfig) -> Result<Self, StoreError> {
        let timeout = config.timeout();
        if timeout.is_zero() {
            return Err(StoreError::Config {
                reason: "redis timeout_secs must be at least 1".to_string(),
            });
        }
        let client = Client::open(connection_info(config)?).map_err(|e| StoreError::Config {
            reason: format!("redis client: {e}"),
        })?;
        debug!(address = %config.address, db = config.db, ?timeout, "redis client configured");
        Ok(Self {
            client,
            password: config.password.clone().filter(|p| !p.is_empty()),
            db: config.db,
            timeout,
        })
    }

    fn connection(&self) -> Result<Connection, StoreError> {
        let mut conn = self
            .client
            .get_connection_with_timeout(self.timeout)
            .map_err(redis_err)?;
        conn.set_read_timeout(Some(self.timeout)).map_err(redis_err)?;
        conn.set_write_timeout(Some(self.timeout)).map_err(redis_err)?;

        // Sent here rather than by the client so the socket timeouts already apply.
        if let Some(password) = &self.password {
            redis::cmd("AUTH")
                .arg(password)
                .query::<()>(&mut conn)
                .map_err(redis_err)?;
        }
        if self.db != 0 {
            redis::cmd("SELECT")
                .arg(self.db)
                .query::<()>(&mut conn)
                .map_err(redis_err)?;
        }
        Ok(conn)
    }
}

impl KeyValueStore for RedisStore {
    #[instrument(skip_all)]
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        get_value(&mut self.connection()?, key)
    }

    #[instrument(skip_all)]
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        set_value(&mut self.connection()?, key, value)
    }

    #[instrument(skip_all)]
    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        delete_key(&mut self.connection()?, key)
    }

    #[instrument(skip_all)]
    fn get_all(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        list_keys(&mut self.connection()?)
    }
}

fn get_value(conn: &mut dyn ConnectionLike, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
    redis::cmd("GET")
        .arg(key)
        .query::<Option<Vec<u8>>>(conn)
        .map_err(redis_err)
}

fn set_value(conn: &mut dyn ConnectionLike, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
    redis::cmd("SET")
        .arg(key)
        .arg(value)
        .query::<()>(conn)
        .map_err(redis_err)
}

fn delete_key(conn: &mut dyn ConnectionLike, key: &[u8]) -> Result<(), StoreError> {
    let removed: i64 = redis::cmd("DEL").arg(key).query(conn).map_err(redis_err)?;
    debug!(removed, "redis delete");
    Ok(())
}

fn list_keys(conn: &mut dyn ConnectionLike) -> Result<Vec<Vec<u8>>, StoreError> {
    let reply: Value = redis::cmd("KEYS").arg("*").query(conn).map_err(redis_err)?;
    decode_key_listing(reply)
}

fn redis_err(err: RedisError) -> StoreError {
    let reason = if err.is_timeout() {
        format!("redis timed out: {err}")
    } else {
        err.to_string()
    };
    StoreError::Storage { reason }
}

/// Build the server address from `host:port`. Credentials and database selection are
/// applied per connection by [`RedisStore`].
fn connection_info(config: &RedisStoreConfig) -> Result<ConnectionInfo, StoreError> {
    let (host, port) = config
        .address
        .rsplit_once(':')
        .ok_or_else(|| StoreError::Config {
            reason: format!("redis address {:?} must be host:port", config.address),
        })?;
    let port: u16 = port.parse().map_err(|e| StoreError::Config {
        reason: format!("redis port {port:?}: {e}"),
    })?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(StoreError::Config {
            reason: format!("redis address {:?} has no host", config.address),
        });
    }

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host.to_string(), port),
        redis: RedisConnectionInfo::default(),
    })
}

/// Decode a `KEYS` reply into raw keys, rejecting anything that is not a list of strings.
fn decode_key_listing(reply: Value) -> Result<Vec<Vec<u8>>, StoreError> {
    let items = match reply {
        Value::Array(items) => items,
        other => {
            return Err(StoreError::Format {
                reason: format!("expected key list, got {other:?}"),
            })
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::BulkString(bytes) => Ok(bytes),
            Value::SimpleString(text) => Ok(text.into_bytes()),
            other => Err(StoreError::Format {
                reason: format!("expected key, got {other:?}"),
            }),
        })
        .collect()
}
