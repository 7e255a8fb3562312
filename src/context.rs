use log::trace;

use crate::data::{Data, DataType};

/// What a context frame holds. Borrowed handles come straight from the
/// caller's data; literals are the synthetic scalars pushed by inverted
/// sections.
#[derive(Clone, Copy)]
pub(crate) enum FrameData<'a> {
    Data(&'a dyn Data),
    Literal(&'static str),
    Nil,
}

impl<'a> FrameData<'a> {
    pub(crate) fn is_truthy(&self) -> bool {
        match self {
            FrameData::Nil => false,
            FrameData::Literal(text) => !falsey_text(text),
            FrameData::Data(data) => match data.type_of() {
                DataType::Map | DataType::Struct | DataType::List => data.length_of() > 0,
                DataType::Value => !falsey_text(&data.to_text()),
                DataType::Nil => false,
            },
        }
    }

    pub(crate) fn as_text(&self) -> String {
        match self {
            FrameData::Nil => String::new(),
            FrameData::Literal(text) => text.to_string(),
            FrameData::Data(data) => match data.type_of() {
                DataType::Value => data.to_text(),
                _ => String::new(),
            },
        }
    }
}

pub(crate) fn falsey_text(text: &str) -> bool {
    matches!(text, "" | "false" | "null")
}

struct Frame<'a> {
    data: FrameData<'a>,
    label: String,
}

/// The resolution stack. The root frame sits at the bottom and is only
/// dropped with the stack itself; the last frame is the innermost scope.
pub(crate) struct Stack<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> Stack<'a> {
    pub(crate) fn root(data: &'a dyn Data) -> Self {
        Stack {
            frames: vec![Frame {
                data: FrameData::Data(data),
                label: "ROOT".to_string(),
            }],
        }
    }

    pub(crate) fn push(&mut self, data: FrameData<'a>, label: String) {
        trace!("push frame {:?} at depth {}", label, self.frames.len());
        self.frames.push(Frame { data, label });
    }

    pub(crate) fn pop(&mut self) {
        if self.frames.len() > 1 {
            if let Some(frame) = self.frames.pop() {
                trace!("pop frame {:?}", frame.label);
            }
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The root frame is truthy no matter what data it holds, so top-level
    /// content always renders.
    pub(crate) fn top_truthy(&self) -> bool {
        self.frames.len() == 1 || self.top().is_truthy()
    }

    pub(crate) fn top(&self) -> FrameData<'a> {
        match self.frames.last() {
            Some(frame) => frame.data,
            None => FrameData::Nil,
        }
    }

    /// Resolve a dotted name. The head binds in the first frame, innermost
    /// outward, that yields a non-nil value; the remaining parts then
    /// resolve strictly against that intermediate, with no second walk of
    /// the stack.
    pub(crate) fn resolve(&self, name: &str) -> FrameData<'a> {
        if name == "." {
            return self.top();
        }
        let parts: Vec<&str> = name.split('.').collect();
        let head = parts[0];
        for frame in self.frames.iter().rev() {
            let FrameData::Data(data) = frame.data else {
                continue;
            };
            let Some(mut found) = child(data, head) else {
                continue;
            };
            if found.is_nil() {
                continue;
            }
            for part in &parts[1..] {
                match child(found, part) {
                    Some(next) if !next.is_nil() => found = next,
                    _ => return FrameData::Nil,
                }
            }
            return FrameData::Data(found);
        }
        FrameData::Nil
    }
}

fn child<'a>(data: &'a dyn Data, name: &str) -> Option<&'a dyn Data> {
    match data.type_of() {
        DataType::Struct if data.has_key(name) => data.get_field(name),
        DataType::Map if data.has_key(name) => data.get_key(name),
        _ => None,
    }
}
