//! Traversal step machine shared by the eager driver and the lazy iterator

use super::{ErrorPolicy, TraversalOrder, WalkOptions};
use crate::fs::FileSystem;
use crate::types::{Entry, IoResultExt, Result, TreeError};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One unit of progress through the tree
#[derive(Debug)]
pub(crate) enum Step {
    /// About to enumerate `dir` (fired before its children)
    EnterDir(Entry),
    /// An entry accepted by the inclusion filter
    Visit(Entry),
    /// All children of `dir` have been processed
    LeaveDir(Entry),
    /// An entry could not be enumerated and was skipped
    Skipped(PathBuf, TreeError),
}

struct Frame {
    dir: Entry,
    children: std::vec::IntoIter<Entry>,
}

enum State {
    Start,
    Running,
    Done,
}

/// Depth-first traversal state.
///
/// Holds only the stack of open directories (each with its already-listed
/// children), so suspending between steps leaves no handle open.
pub(crate) struct Traversal<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    options: WalkOptions,
    state: State,
    stack: Vec<Frame>,
    pending: VecDeque<Step>,
}

impl<'a> Traversal<'a> {
    pub(crate) fn new(fs: &'a dyn FileSystem, root: &Path, options: WalkOptions) -> Self {
        Self {
            fs,
            root: root.to_path_buf(),
            options,
            state: State::Start,
            stack: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Advance by one step. `None` once the tree is exhausted or after an
    /// error under the abort policy.
    pub(crate) fn next_step(&mut self) -> Option<Result<Step>> {
        loop {
            if let Some(step) = self.pending.pop_front() {
                return Some(Ok(step));
            }

            match self.state {
                State::Done => return None,
                State::Start => {
                    self.state = State::Running;
                    match self.stat_root() {
                        Ok(root) => {
                            if let Err(e) = self.open_directory(root) {
                                self.finish();
                                return Some(Err(e));
                            }
                        }
                        Err(e) => {
                            self.finish();
                            return Some(Err(e));
                        }
                    }
                }
                State::Running => {
                    let Some(frame) = self.stack.last_mut() else {
                        self.state = State::Done;
                        return None;
                    };

                    match frame.children.next() {
                        None => {
                            if let Some(frame) = self.stack.pop() {
                                self.close_directory(frame.dir);
                            }
                        }
                        Some(child) => {
                            if let Err(e) = self.process_child(child) {
                                self.finish();
                                return Some(Err(e));
                            }
                        }
                    }
                }
            }
        }
    }

    fn finish(&mut self) {
        self.state = State::Done;
        self.stack.clear();
        self.pending.clear();
    }

    /// The root is followed if it is a symlink: the caller named it explicitly.
    fn stat_root(&self) -> Result<Entry> {
        let metadata = self.fs.metadata(&self.root).at(&self.root)?;
        if !metadata.is_dir() {
            return Err(TreeError::NotADirectory {
                path: self.root.clone(),
            });
        }
        Ok(Entry::from_metadata(self.root.clone(), &metadata))
    }

    fn process_child(&mut self, child: Entry) -> Result<()> {
        if !child.is_dir() {
            // Files and symlinks (including links to directories) are terminal.
            if self.options.filters.should_include(&child) {
                self.pending.push_back(Step::Visit(child));
            }
            return Ok(());
        }

        let report = self.options.include_dirs && self.options.filters.should_include(&child);
        let pre_order = self.options.order == TraversalOrder::PreOrder;

        if report && pre_order {
            self.pending.push_back(Step::Visit(child.clone()));
        }

        if self.options.filters.should_descend(&child) {
            self.open_directory(child)
        } else {
            if report && !pre_order {
                self.pending.push_back(Step::Visit(child));
            }
            Ok(())
        }
    }

    fn open_directory(&mut self, dir: Entry) -> Result<()> {
        match self.fs.read_dir(&dir.path) {
            Ok(mut children) => {
                let depth = dir.depth + 1;
                children.sort_by(|a, b| a.name().cmp(b.name()));
                let children: Vec<Entry> = children
                    .into_iter()
                    .map(|child| child.with_depth(depth))
                    .collect();

                self.pending.push_back(Step::EnterDir(dir.clone()));
                self.stack.push(Frame {
                    dir,
                    children: children.into_iter(),
                });
                Ok(())
            }
            Err(e) => match self.options.on_error {
                ErrorPolicy::Abort => Err(e),
                ErrorPolicy::Skip if dir.depth == 0 => Err(e),
                ErrorPolicy::Skip => {
                    warn!("Skipping unreadable directory {}: {}", dir.path.display(), e);
                    self.pending.push_back(Step::Skipped(dir.path.clone(), e));
                    if self.options.order == TraversalOrder::PostOrder
                        && self.options.include_dirs
                        && self.options.filters.should_include(&dir)
                    {
                        self.pending.push_back(Step::Visit(dir));
                    }
                    Ok(())
                }
            },
        }
    }

    fn close_directory(&mut self, dir: Entry) {
        let is_root = dir.depth == 0;
        if !is_root
            && self.options.order == TraversalOrder::PostOrder
            && self.options.include_dirs
            && self.options.filters.should_include(&dir)
        {
            self.pending.push_back(Step::Visit(dir.clone()));
        }
        self.pending.push_back(Step::LeaveDir(dir));
    }
}
