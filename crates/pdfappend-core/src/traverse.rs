//! Object graph traversal
//!
//! Walks the object graph from the trailer and collects every place a given
//! object is referenced. PDF object graphs are cyclic (`/Parent` links point
//! back up the page tree), so the walk never follows an edge to an object
//! numbered lower than or equal to the object it is currently inside.
//! Files are overwhelmingly written with forward references, and `/Parent`
//! is the one expected exception, so only other back edges are reported.

use crate::diagnostics::Warning;
use crate::reader::Reader;
use crate::value::{ObjRef, Value};

/// Result of [`find_object`].
#[derive(Debug, Default)]
pub struct Traversal {
    /// Every occurrence, as `Value::Definition`, depth-first order.
    pub found: Vec<Value>,
    pub warnings: Vec<Warning>,
}

/// Find every occurrence of object `target` reachable from the trailer.
///
/// More than one result means the object is referenced from more than one place.
pub fn find_object<R: Reader + ?Sized>(reader: &R, target: u32) -> Traversal {
    let mut walk = Walk {
        reader,
        target,
        result: Traversal::default(),
    };
    for (key, value) in reader.trailer().iter() {
        walk.visit(key, value, 0);
    }
    walk.result
}

struct Walk<'r, R: ?Sized> {
    reader: &'r R,
    target: u32,
    result: Traversal,
}

impl<R: Reader + ?Sized> Walk<'_, R> {
    /// Visit `value`, found under `key` inside indirect object `owner`.
    fn visit(&mut self, key: &str, value: &Value, owner: u32) {
        match value {
            Value::Reference(reference) => self.follow(key, *reference, owner),
            Value::Dictionary(dict) => {
                for (k, v) in dict.iter() {
                    self.visit(k, v, owner);
                }
            }
            Value::Stream(stream) => {
                for (k, v) in stream.dict.iter() {
                    self.visit(k, v, owner);
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.visit(&i.to_string(), item, owner);
                }
            }
            _ => {}
        }
    }

    fn follow(&mut self, key: &str, reference: ObjRef, owner: u32) {
        if reference.0 <= owner {
            if key != "Parent" {
                self.result.warnings.push(
                    Warning::BackEdge {
                        key: key.to_string(),
                        from: owner,
                        to: reference.0,
                    }
                    .emit(),
                );
            }
            return;
        }

        let Some(value) = self.reader.resolve(reference) else {
            self.result.warnings.push(
                Warning::UnresolvedReference {
                    key: key.to_string(),
                    reference,
                }
                .emit(),
            );
            return;
        };

        if reference.0 == self.target {
            self.result.found.push(Value::Definition {
                reference,
                value: Box::new(value),
            });
            return;
        }

        self.visit(key, &value, reference.0);
    }
}
