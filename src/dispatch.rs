// This file is part of kvreactor.
// Copyright (C) 2026 kvreactor contributors
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command dispatch: match `(verb, argc)`, mutate the keyspace, produce a
//! reply.

use crate::error::CommandError;
use crate::keyspace::{Entry, Keyspace};
use crate::wire::reply::{Reply, ERR_UNKNOWN};

/// Parse and run one command against `keyspace`, returning the reply to
/// send back. Never panics on malformed input; unparseable arguments become
/// an error reply rather than a closed connection.
pub fn dispatch(keyspace: &mut Keyspace, args: &[Vec<u8>]) -> Reply {
    let Some(verb) = args.first() else {
        return unknown_reply(CommandError::WrongArity);
    };
    let verb = String::from_utf8_lossy(verb).to_ascii_uppercase();
    match (verb.as_str(), args.len()) {
        ("GET", 2) => do_get(keyspace, &args[1]),
        ("SET", 3) => do_set(keyspace, &args[1], &args[2]),
        ("DEL", 2) => do_del(keyspace, &args[1]),
        ("KEYS", 1) => do_keys(keyspace),
        ("ZADD", 4) => do_zadd(keyspace, &args[1], &args[2], &args[3]),
        ("ZSCORE", 3) => do_zscore(keyspace, &args[1], &args[2]),
        ("ZREM", 3) => do_zrem(keyspace, &args[1], &args[2]),
        ("ZQUERY", 6) => do_zquery(
            keyspace, &args[1], &args[2], &args[3], &args[4], &args[5],
        ),
        _ => {
            tracing::debug!(verb = %verb, argc = args.len(), "unknown command or wrong arity");
            unknown_reply(CommandError::UnknownCommand)
        }
    }
}

fn unknown_reply(err: CommandError) -> Reply {
    Reply::err(err.code(), err.to_string())
}

fn as_str(arg: &[u8]) -> String {
    String::from_utf8_lossy(arg).into_owned()
}

fn parse_f64(arg: &[u8]) -> Option<f64> {
    as_str(arg).parse().ok()
}

fn parse_usize(arg: &[u8]) -> Option<usize> {
    as_str(arg).parse().ok()
}

fn do_get(keyspace: &mut Keyspace, key: &[u8]) -> Reply {
    let key = as_str(key);
    match keyspace.get(&key) {
        Some(Entry::Str(s)) => Reply::str(s.as_bytes().to_vec()),
        Some(Entry::ZSet(_)) => {
            CommandError::WrongType("value at key is a zset, not a string".to_string()).into()
        }
        None => Reply::Nil,
    }
}

fn do_set(keyspace: &mut Keyspace, key: &[u8], value: &[u8]) -> Reply {
    let key = as_str(key);
    keyspace.set(&key, Entry::Str(as_str(value)));
    Reply::Nil
}

fn do_del(keyspace: &mut Keyspace, key: &[u8]) -> Reply {
    let key = as_str(key);
    Reply::Int(if keyspace.delete(&key) { 1 } else { 0 })
}

fn do_keys(keyspace: &mut Keyspace) -> Reply {
    let keys = keyspace.keys();
    Reply::Arr(keys.into_iter().map(|k| Reply::str(k.into_bytes())).collect())
}

fn do_zadd(keyspace: &mut Keyspace, key: &[u8], score: &[u8], name: &[u8]) -> Reply {
    let Some(score) = parse_f64(score) else {
        return Reply::err(ERR_UNKNOWN, "score is not a valid number");
    };
    let key = as_str(key);
    let name = as_str(name);
    match keyspace.zset_mut(&key) {
        Ok(z) => Reply::Int(if z.add(&name, score) { 1 } else { 0 }),
        Err(msg) => CommandError::WrongType(msg.to_string()).into(),
    }
}

fn do_zscore(keyspace: &mut Keyspace, key: &[u8], name: &[u8]) -> Reply {
    let key = as_str(key);
    let name = as_str(name);
    match keyspace.get_mut(&key) {
        Some(Entry::ZSet(z)) => match z.score(&name) {
            Some(score) => Reply::str(format!("{score}").into_bytes()),
            None => Reply::Nil,
        },
        Some(Entry::Str(_)) => {
            CommandError::WrongType("value at key is not a zset".to_string()).into()
        }
        None => Reply::Nil,
    }
}

fn do_zrem(keyspace: &mut Keyspace, key: &[u8], name: &[u8]) -> Reply {
    let key = as_str(key);
    let name = as_str(name);
    match keyspace.get_mut(&key) {
        Some(Entry::ZSet(z)) => Reply::Int(if z.remove(&name) { 1 } else { 0 }),
        Some(Entry::Str(_)) => {
            CommandError::WrongType("value at key is not a zset".to_string()).into()
        }
        None => Reply::Int(0),
    }
}

fn do_zquery(
    keyspace: &mut Keyspace,
    key: &[u8],
    score: &[u8],
    name: &[u8],
    offset: &[u8],
    limit: &[u8],
) -> Reply {
    let (Some(score), Some(offset), Some(limit)) = (
        parse_f64(score),
        parse_usize(offset),
        parse_usize(limit),
    ) else {
        return Reply::err(ERR_UNKNOWN, "score/offset/limit must be valid numbers");
    };
    let key = as_str(key);
    let name = as_str(name);
    match keyspace.get_mut(&key) {
        Some(Entry::ZSet(z)) => {
            let members = z.query(score, &name, offset, limit);
            let mut out = Vec::with_capacity(members.len() * 2);
            for m in members {
                out.push(Reply::str(m.name.into_bytes()));
                out.push(Reply::str(format!("{}", m.score).into_bytes()));
            }
            Reply::Arr(out)
        }
        Some(Entry::Str(_)) => {
            CommandError::WrongType("value at key is not a zset".to_string()).into()
        }
        None => Reply::Arr(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<Vec<u8>> {
        strs.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    #[test]
    fn get_on_empty_keyspace_is_nil() {
        let mut ks = Keyspace::new();
        assert_eq!(dispatch(&mut ks, &args(&["GET", "missing"])), Reply::Nil);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut ks = Keyspace::new();
        dispatch(&mut ks, &args(&["SET", "k", "v"]));
        assert_eq!(
            dispatch(&mut ks, &args(&["GET", "k"])),
            Reply::str(b"v".to_vec())
        );
    }

    #[test]
    fn del_is_idempotent_and_reports_whether_it_deleted() {
        let mut ks = Keyspace::new();
        dispatch(&mut ks, &args(&["SET", "k", "v"]));
        assert_eq!(dispatch(&mut ks, &args(&["DEL", "k"])), Reply::Int(1));
        assert_eq!(dispatch(&mut ks, &args(&["DEL", "k"])), Reply::Int(0));
    }

    #[test]
    fn unknown_verb_or_wrong_arity_is_an_error() {
        let mut ks = Keyspace::new();
        assert!(matches!(
            dispatch(&mut ks, &args(&["NOPE"])),
            Reply::Err(..)
        ));
        assert!(matches!(
            dispatch(&mut ks, &args(&["GET"])),
            Reply::Err(..)
        ));
    }

    #[test]
    fn zadd_zscore_zrem_zquery_round_trip() {
        let mut ks = Keyspace::new();
        assert_eq!(
            dispatch(&mut ks, &args(&["ZADD", "z", "1.5", "alice"])),
            Reply::Int(1)
        );
        assert_eq!(
            dispatch(&mut ks, &args(&["ZADD", "z", "2.5", "bob"])),
            Reply::Int(1)
        );
        assert_eq!(
            dispatch(&mut ks, &args(&["ZSCORE", "z", "alice"])),
            Reply::str(b"1.5".to_vec())
        );
        let q = dispatch(&mut ks, &args(&["ZQUERY", "z", "0", "", "0", "10"]));
        match q {
            Reply::Arr(items) => assert_eq!(items.len(), 4),
            _ => panic!("expected an array reply"),
        }
        assert_eq!(dispatch(&mut ks, &args(&["ZREM", "z", "alice"])), Reply::Int(1));
        assert_eq!(
            dispatch(&mut ks, &args(&["ZSCORE", "z", "alice"])),
            Reply::Nil
        );
    }

    #[test]
    fn zadd_on_a_string_key_is_a_type_error() {
        let mut ks = Keyspace::new();
        dispatch(&mut ks, &args(&["SET", "s", "x"]));
        assert!(matches!(
            dispatch(&mut ks, &args(&["ZADD", "s", "1", "a"])),
            Reply::Err(..)
        ));
    }
}
