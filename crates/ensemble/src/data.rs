//! Deferred render slots
//!
//! A `Data` table maps keys to slots. A slot is either a description that
//! has not been built yet or a live composition together with the
//! description it was built from, so it can be rebuilt.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{Composition, Ensemble, Error, Name, Props, Result};

/// Lifecycle callback of a slot
pub type SlotCallback = Rc<dyn Fn(&Composition)>;

/// Everything needed to build a slot's composition
#[derive(Clone, Default)]
pub struct SlotParams {
    pub tag: String,
    pub name: Name,
    pub props: Props,
    pub fresh: Option<SlotCallback>,
    pub stale: Option<SlotCallback>,
}

impl std::fmt::Debug for SlotParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotParams")
            .field("tag", &self.tag)
            .field("name", &self.name)
            .field("props", &self.props)
            .field("fresh", &self.fresh.is_some())
            .field("stale", &self.stale.is_some())
            .finish()
    }
}

/// A described composition, built or not
#[derive(Debug, Clone)]
pub enum Slot {
    Deferred(SlotParams),
    Live {
        compo: Composition,
        params: SlotParams,
    },
}

impl Slot {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }

    pub fn compo(&self) -> Option<&Composition> {
        match self {
            Self::Live { compo, .. } => Some(compo),
            Self::Deferred(_) => None,
        }
    }

    pub fn params(&self) -> &SlotParams {
        match self {
            Self::Deferred(params) | Self::Live { params, .. } => params,
        }
    }
}

/// Keyed table of render slots
pub struct Data {
    ensemble: Ensemble,
    namespace: String,
    slots: HashMap<String, Slot>,
}

impl Data {
    pub fn new(ensemble: &Ensemble, namespace: &str) -> Self {
        Self {
            ensemble: ensemble.clone(),
            namespace: namespace.to_string(),
            slots: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Describe a composition
    ///
    /// Built right away unless `deferred`. The callbacks are also bound as
    /// `onfresh`/`onstale` handlers, so dispatching a `fresh` or `stale`
    /// event on the node reaches them too.
    pub fn describe(
        &self,
        tag: &str,
        name: impl Into<Name>,
        props: Props,
        deferred: bool,
        fresh: Option<SlotCallback>,
        stale: Option<SlotCallback>,
    ) -> Result<Slot> {
        let mut props = props;
        if let Some(cb) = &fresh {
            let cb = cb.clone();
            props = props.on("fresh", move |compo, _| cb(compo));
        }
        if let Some(cb) = &stale {
            let cb = cb.clone();
            props = props.on("stale", move |compo, _| cb(compo));
        }
        let params = SlotParams {
            tag: tag.to_string(),
            name: name.into(),
            props,
            fresh,
            stale,
        };

        if deferred {
            tracing::debug!("Described deferred <{}>", params.tag);
            return Ok(Slot::Deferred(params));
        }
        let compo = self.build(&params)?;
        Ok(Slot::Live { compo, params })
    }

    /// Store a slot, returning the one it replaces
    pub fn insert(&mut self, key: impl Into<String>, slot: Slot) -> Option<Slot> {
        self.slots.insert(key.into(), slot)
    }

    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.slots.get(key)
    }

    /// Live composition of a slot
    pub fn compo(&self, key: &str) -> Option<Composition> {
        self.get(key).and_then(Slot::compo).cloned()
    }

    pub fn remove(&mut self, key: &str) -> Option<Slot> {
        self.slots.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Activate a slot
    ///
    /// A deferred slot is built and becomes live first. `fresh` runs in
    /// both cases; a live slot is never rebuilt here.
    pub fn render(&mut self, key: &str) -> Result<Composition> {
        let slot = self.slot_mut(key)?;
        if let Slot::Deferred(params) = slot {
            let params = params.clone();
            let compo = build(&self.ensemble, &self.namespace, &params)?;
            tracing::debug!("Slot '{}' rendered as {:?}", key, compo);
            self.slots
                .insert(key.to_string(), Slot::Live { compo, params });
        }
        self.fresh(key)
    }

    /// Notify a live slot that it went inactive; the composition is kept
    pub fn stale(&mut self, key: &str) -> Result<()> {
        if let Slot::Live { compo, params } = self.slot_mut(key)? {
            let (compo, stale) = (compo.clone(), params.stale.clone());
            tracing::trace!("Slot '{}' stale", key);
            if let Some(stale) = stale {
                stale(&compo);
            }
        }
        Ok(())
    }

    /// Re-activate or rebuild a slot
    ///
    /// With `force` a new composition is built from the stored description.
    /// It takes the old node's place when that one is attached, then `fresh`
    /// runs. Without `force` a live slot only runs `fresh` and a deferred
    /// slot is left alone, returning `None`.
    pub fn reflow(&mut self, key: &str, force: bool) -> Result<Option<Composition>> {
        let live = self.slot_mut(key)?.is_live();
        if !force {
            if live {
                return self.fresh(key).map(Some);
            }
            tracing::trace!("Slot '{}' not rendered, nothing to reflow", key);
            return Ok(None);
        }

        let (old, params) = match self.slot_mut(key)? {
            Slot::Live { compo, params } => (Some(compo.clone()), params.clone()),
            Slot::Deferred(params) => (None, params.clone()),
        };
        let compo = build(&self.ensemble, &self.namespace, &params)?;
        if let Some(old) = &old {
            compo.up(old.id())?;
        }
        tracing::debug!("Slot '{}' rebuilt as {:?}", key, compo);
        self.slots
            .insert(key.to_string(), Slot::Live { compo, params });
        drop(old);
        self.fresh(key).map(Some)
    }

    /// Type check for values of unknown type
    pub fn is_data(obj: &dyn Any) -> bool {
        obj.is::<Data>()
    }

    fn slot_mut(&mut self, key: &str) -> Result<&mut Slot> {
        self.slots
            .get_mut(key)
            .ok_or_else(|| Error::UnknownSlot(key.to_string()))
    }

    fn build(&self, params: &SlotParams) -> Result<Composition> {
        build(&self.ensemble, &self.namespace, params)
    }

    /// Run `fresh` on a live slot and hand back its composition
    fn fresh(&self, key: &str) -> Result<Composition> {
        let Some(Slot::Live { compo, params }) = self.slots.get(key) else {
            return Err(Error::UnknownSlot(key.to_string()));
        };
        let (compo, fresh) = (compo.clone(), params.fresh.clone());
        if let Some(fresh) = fresh {
            fresh(&compo);
        }
        Ok(compo)
    }
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("namespace", &self.namespace)
            .field("slots", &self.slots)
            .finish()
    }
}

fn build(ensemble: &Ensemble, namespace: &str, params: &SlotParams) -> Result<Composition> {
    Composition::builder(ensemble, namespace)
        .tag(&params.tag)
        .name(params.name.clone())
        .props(params.props.clone())
        .build()
}
