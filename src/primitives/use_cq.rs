//! `use_cq` - mount-time registration of a component's queries.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::engine::ContainerQ;
use crate::error::Result;
use crate::host::Host;
use crate::types::{Element, QueryId};

use super::types::{Cleanup, QueryProps};

/// Result of mounting a component's queries.
pub struct Mounted {
    /// Ids of the registered queries, in prop order (props without an
    /// activation are skipped).
    pub ids: Vec<QueryId>,
    /// Stops every query on the element.
    pub cleanup: Cleanup,
}

/// Register `queries` on `element` against a shared engine.
///
/// Either every query is registered or none is: a prop that fails validation
/// rolls back the ones registered before it and returns the error.
///
/// Activations run while the engine is borrowed for `on_resize`, so they must
/// not call back into the engine or run the returned cleanup synchronously.
pub fn use_cq<E, H>(
    engine: &Rc<RefCell<ContainerQ<E>>>,
    host: &Rc<RefCell<H>>,
    element: E,
    queries: &[QueryProps],
) -> Result<Mounted>
where
    E: Element,
    H: Host<E> + 'static,
{
    let mut ids = Vec::with_capacity(queries.len());

    {
        let mut cq = engine.borrow_mut();
        let mut host = host.borrow_mut();

        for props in queries {
            let Some(activation) = props.activation() else {
                debug!(
                    ?element,
                    breakpoint = %props.breakpoint,
                    "query without activation ignored"
                );
                continue;
            };

            match cq.query(&mut *host, element, props.breakpoint, activation) {
                Ok(id) => ids.push(id),
                Err(err) => {
                    for id in ids {
                        cq.stop_querying(&mut *host, id);
                    }
                    return Err(err);
                }
            }
        }
    }

    let engine = engine.clone();
    let host = host.clone();
    let cleanup: Cleanup = Box::new(move || {
        engine
            .borrow_mut()
            .stop_querying_element(&mut *host.borrow_mut(), element);
    });

    Ok(Mounted { ids, cleanup })
}
