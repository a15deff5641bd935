//! Per-page annotation store with bounded undo/redo history
//!
//! Every mutating operation pushes the pre-mutation annotation array onto
//! the page's undo ring and clears its redo ring; undo/redo swap whole
//! arrays between the rings in a single replacement, so the pair is atomic
//! with respect to any observer. History depth is a structural property of
//! the ring, not a maintained invariant.

use crate::annotation::{anchor_point, Annotation, AnnotationId, AnnotationPatch};
use crate::sanitize::sanitize_label_html;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

/// Default cap on undo/redo history per page
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Append-bounded ring of annotation-array snapshots
///
/// Pushing beyond capacity silently evicts the oldest entry; the cap can
/// never be exceeded by construction.
#[derive(Debug, Clone, Default)]
pub struct BoundedStack {
    entries: VecDeque<Vec<Annotation>>,
    cap: usize,
}

impl BoundedStack {
    pub fn new(cap: usize) -> Self {
        Self { entries: VecDeque::new(), cap: cap.max(1) }
    }

    pub fn push(&mut self, snapshot: Vec<Annotation>) {
        if self.entries.len() == self.cap {
            self.entries.pop_front();
            log::debug!("history ring full, evicting oldest snapshot");
        }
        self.entries.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<Vec<Annotation>> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Annotations and history for one page
#[derive(Debug, Clone)]
pub struct PageHistory {
    annotations: Vec<Annotation>,
    undo: BoundedStack,
    redo: BoundedStack,
}

impl PageHistory {
    fn new(depth: usize) -> Self {
        Self {
            annotations: Vec::new(),
            undo: BoundedStack::new(depth),
            redo: BoundedStack::new(depth),
        }
    }

    fn checkpoint(&mut self) {
        self.undo.push(self.annotations.clone());
        self.redo.clear();
    }
}

/// Document-wide annotation store, keyed by 1-based page number
///
/// Page entries are created lazily on first mutation and discarded
/// wholesale when the containing document changes. Mutation happens only on
/// the UI thread; there is no external mutation path.
#[derive(Debug)]
pub struct AnnotationStore {
    pages: HashMap<u16, PageHistory>,
    history_depth: usize,
}

impl AnnotationStore {
    pub fn new(history_depth: usize) -> Self {
        Self { pages: HashMap::new(), history_depth: history_depth.max(1) }
    }

    /// Annotations for a page, in insertion order; empty if untouched
    pub fn annotations(&self, page: u16) -> &[Annotation] {
        self.pages.get(&page).map(|h| h.annotations.as_slice()).unwrap_or(&[])
    }

    /// Cloned records for the persistence collaborator
    pub fn page_records(&self, page: u16) -> Vec<Annotation> {
        self.annotations(page).to_vec()
    }

    /// Undo-ring depth for a page (test and diagnostics hook)
    pub fn undo_depth(&self, page: u16) -> usize {
        self.pages.get(&page).map(|h| h.undo.len()).unwrap_or(0)
    }

    fn page_mut(&mut self, page: u16) -> &mut PageHistory {
        let depth = self.history_depth;
        match self.pages.entry(page) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(PageHistory::new(depth)),
        }
    }

    /// Append a committed annotation, pushing undo history
    ///
    /// Label markup on text and arrow annotations is sanitized before it
    /// enters the store.
    pub fn commit(&mut self, page: u16, mut annotation: Annotation) {
        sanitize_in_place(&mut annotation);
        let history = self.page_mut(page);
        history.checkpoint();
        history.annotations.push(annotation);
    }

    /// Live edit without history: per-keystroke text changes, drag frames
    pub fn update(&mut self, page: u16, id: AnnotationId, patch: &AnnotationPatch) -> bool {
        let Some(history) = self.pages.get_mut(&page) else {
            return false;
        };
        apply_patch(&mut history.annotations, id, patch)
    }

    /// Apply a patch as one undoable step (blur/defocus, end of drag)
    ///
    /// This batches any preceding run of live `update` calls into a single
    /// entry on the undo ring.
    pub fn commit_update(&mut self, page: u16, id: AnnotationId, patch: &AnnotationPatch) -> bool {
        let Some(history) = self.pages.get_mut(&page) else {
            return false;
        };
        if !history.annotations.iter().any(|a| a.id() == Some(id)) {
            return false;
        }
        history.checkpoint();
        apply_patch(&mut history.annotations, id, patch)
    }

    /// Remove an annotation, pushing undo history
    ///
    /// Dependent links cascade: texts pointing at a removed rectangle lose
    /// their `pointer_id`. Arrow labels are embedded in their arrow and
    /// disappear with it.
    pub fn remove(&mut self, page: u16, id: AnnotationId) -> bool {
        let Some(history) = self.pages.get_mut(&page) else {
            return false;
        };
        let Some(index) = history.annotations.iter().position(|a| a.id() == Some(id)) else {
            return false;
        };

        history.checkpoint();
        history.annotations.remove(index);
        for annotation in &mut history.annotations {
            if let Annotation::Text { pointer_id, .. } = annotation {
                if *pointer_id == Some(id) {
                    *pointer_id = None;
                }
            }
        }
        true
    }

    /// Replace the page's annotations with an empty array; undoable
    pub fn clear(&mut self, page: u16) {
        let history = self.page_mut(page);
        history.checkpoint();
        history.annotations.clear();
    }

    /// Restore the previous snapshot; no-op when there is none
    pub fn undo(&mut self, page: u16) -> bool {
        let Some(history) = self.pages.get_mut(&page) else {
            return false;
        };
        let Some(previous) = history.undo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut history.annotations, previous);
        history.redo.push(current);
        true
    }

    /// Reapply the most recently undone snapshot; no-op when there is none
    pub fn redo(&mut self, page: u16) -> bool {
        let Some(history) = self.pages.get_mut(&page) else {
            return false;
        };
        let Some(next) = history.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut history.annotations, next);
        history.undo.push(current);
        true
    }

    /// Attach a late capture result to a rectangle, check-then-apply
    ///
    /// A capture resolving after its rectangle was deleted silently
    /// discards its result. No history entry: the snapshot is derived
    /// state, not a user edit.
    pub fn attach_snapshot(&mut self, page: u16, id: AnnotationId, data_url: String) -> bool {
        let Some(history) = self.pages.get_mut(&page) else {
            return false;
        };
        for annotation in &mut history.annotations {
            if let Annotation::Rectangle { id: rect_id, snapshot_data_url, .. } = annotation {
                if *rect_id == id {
                    *snapshot_data_url = Some(data_url);
                    return true;
                }
            }
        }
        log::debug!("discarding snapshot for deleted rectangle {id}");
        false
    }

    /// Drop all pages; called when the containing document is replaced
    pub fn document_changed(&mut self) {
        self.pages.clear();
    }
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

fn sanitize_in_place(annotation: &mut Annotation) {
    match annotation {
        Annotation::Text { html, text, .. } => {
            let clean = sanitize_label_html(html);
            *html = clean.html;
            *text = clean.text;
        }
        Annotation::Arrow { label, .. } => {
            let clean = sanitize_label_html(&label.html);
            label.html = clean.html;
            label.text = clean.text;
        }
        Annotation::Stroke { .. } | Annotation::Rectangle { .. } => {}
    }
}

fn apply_patch(annotations: &mut [Annotation], id: AnnotationId, patch: &AnnotationPatch) -> bool {
    let Some(annotation) = annotations.iter_mut().find(|a| a.id() == Some(id)) else {
        return false;
    };

    match annotation {
        Annotation::Stroke { .. } => false,
        Annotation::Text { bounds, html, text, color, font_size, .. } => {
            if let Some(new_bounds) = patch.bounds {
                *bounds = new_bounds;
            }
            if let Some(raw) = &patch.html {
                let clean = sanitize_label_html(raw);
                *html = clean.html;
                *text = clean.text;
            }
            if let Some(new_color) = patch.color {
                *color = new_color;
            }
            if let Some(new_size) = patch.font_size {
                *font_size = new_size;
            }
            true
        }
        Annotation::Arrow { line, label, .. } => {
            if let Some(head) = patch.arrow_head {
                line.end = head;
            }
            if let Some(new_bounds) = patch.bounds {
                label.bounds = new_bounds;
            }
            if let Some(raw) = &patch.html {
                let clean = sanitize_label_html(raw);
                label.html = clean.html;
                label.text = clean.text;
            }
            if let Some(new_color) = patch.color {
                label.color = new_color;
            }
            if let Some(new_size) = patch.font_size {
                label.font_size = new_size;
            }
            // Moving or resizing the label reassigns the anchor so the line
            // stays attached to the box edge facing the head.
            line.start = anchor_point(&label.bounds, line.end);
            true
        }
        Annotation::Rectangle { bounds, color, width, title, description, insight_id, .. } => {
            if let Some(new_bounds) = patch.bounds {
                *bounds = new_bounds;
            }
            if let Some(new_color) = patch.color {
                *color = new_color;
            }
            if let Some(new_width) = patch.width {
                *width = new_width;
            }
            if let Some(new_title) = &patch.title {
                *title = new_title.clone();
            }
            if let Some(new_description) = &patch.description {
                *description = new_description.clone();
            }
            if let Some(new_insight) = &patch.insight_id {
                *insight_id = new_insight.clone();
            }
            true
        }
    }
}
