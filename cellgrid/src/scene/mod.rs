//! The scene: the authoritative store of placed elements and virtual lines.
//!
//! Every entry records a creation sequence number, and every ordered view of
//! the scene is sorted by it. Derived results (virtual-line suffixes, per-cell
//! membership order) therefore follow insertion order rather than arena layout.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use subgeom::Segment;

use crate::deps::arcstr::ArcStr;
use crate::log::LogSummary;
use crate::partition::cell::{CellKey, EdgeType};

pub mod element;

pub use element::*;

new_key_type! {
    /// A unique identifier for a placed [`Element`].
    pub struct ElementKey;
    /// A unique identifier for a [`VirtualLine`].
    pub struct VLineKey;
}

/// How a virtual line came to exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derivation {
    /// Material of the element whose endpoint touched the edge.
    pub source: ArcStr,
    pub cell: CellKey,
    pub edge_type: EdgeType,
}

/// A named alignment line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualLine {
    pub name: ArcStr,
    pub segment: Segment,
    /// `None` for lines declared in specification text.
    pub derivation: Option<Derivation>,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    seq: u64,
    item: T,
}

#[derive(Debug, Default, Clone)]
pub struct Scene {
    elements: SlotMap<ElementKey, Entry<Element>>,
    vlines: SlotMap<VLineKey, Entry<VirtualLine>>,
    next_seq: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Adds an element, returning its key.
    pub fn add(&mut self, element: impl Into<Element>) -> ElementKey {
        let seq = self.next_seq();
        self.elements.insert(Entry {
            seq,
            item: element.into(),
        })
    }

    pub fn remove(&mut self, key: ElementKey) -> Option<Element> {
        self.elements.remove(key).map(|entry| entry.item)
    }

    pub fn get(&self, key: ElementKey) -> Option<&Element> {
        self.elements.get(key).map(|entry| &entry.item)
    }

    pub fn get_mut(&mut self, key: ElementKey) -> Option<&mut Element> {
        self.elements.get_mut(key).map(|entry| &mut entry.item)
    }

    #[inline]
    pub fn contains(&self, key: ElementKey) -> bool {
        self.elements.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in creation order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementKey, &Element)> {
        let mut entries: Vec<_> = self.elements.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.seq);
        entries.into_iter().map(|(key, entry)| (key, &entry.item))
    }

    /// Element keys in creation order.
    pub fn keys(&self) -> Vec<ElementKey> {
        self.elements().map(|(key, _)| key).collect()
    }

    /// Wires in creation order.
    pub fn wires(&self) -> impl Iterator<Item = (ElementKey, &Wire)> {
        self.elements()
            .filter_map(|(key, element)| element.as_wire().map(|w| (key, w)))
    }

    /// Contacts in creation order.
    pub fn contacts(&self) -> impl Iterator<Item = (ElementKey, &Contact)> {
        self.elements()
            .filter_map(|(key, element)| element.as_contact().map(|c| (key, c)))
    }

    /// Transistors in creation order.
    pub fn transistors(&self) -> impl Iterator<Item = (ElementKey, &Transistor)> {
        self.elements()
            .filter_map(|(key, element)| element.as_transistor().map(|t| (key, t)))
    }

    /// Removes every element for which `keep` returns `false`, returning the number removed.
    pub fn retain(&mut self, mut keep: impl FnMut(ElementKey, &Element) -> bool) -> usize {
        let before = self.elements.len();
        self.elements.retain(|key, entry| keep(key, &entry.item));
        before - self.elements.len()
    }

    pub fn add_vline(&mut self, vline: VirtualLine) -> VLineKey {
        let seq = self.next_seq();
        self.vlines.insert(Entry { seq, item: vline })
    }

    pub fn vline(&self, key: VLineKey) -> Option<&VirtualLine> {
        self.vlines.get(key).map(|entry| &entry.item)
    }

    /// All virtual lines in creation order.
    pub fn vlines(&self) -> impl Iterator<Item = (VLineKey, &VirtualLine)> {
        let mut entries: Vec<_> = self.vlines.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.seq);
        entries.into_iter().map(|(key, entry)| (key, &entry.item))
    }

    /// Returns the first virtual line (in creation order) with the given name.
    pub fn vline_named(&self, name: &str) -> Option<&VirtualLine> {
        self.vlines()
            .map(|(_, vline)| vline)
            .find(|vline| vline.name == name)
    }

    /// Removes every virtual line matching `pred`, returning the removed names.
    pub fn remove_vlines_where(&mut self, mut pred: impl FnMut(&VirtualLine) -> bool) -> Vec<ArcStr> {
        let mut removed = Vec::new();
        self.vlines.retain(|_, entry| {
            if pred(&entry.item) {
                removed.push(entry.item.name.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn clear_vlines(&mut self) {
        self.vlines.clear();
    }

    #[inline]
    pub fn num_vlines(&self) -> usize {
        self.vlines.len()
    }
}

impl LogSummary for Scene {
    fn log_summary(&self) {
        crate::log::debug!(
            "scene: {} elements, {} virtual lines",
            self.elements.len(),
            self.vlines.len()
        );
    }
}
