use std::fmt;
use std::ops;
use std::slice;
use std::vec;

use crate::boxed::Boxed;
use crate::function::Function;
use crate::traits::Boxable;

/// Build a [`Boxes`] from a list of values of any boxable type.
///
/// Each argument is added with [`Boxes::add`], so boxes are added as they are and sequences of
/// boxes are flattened.
///
/// # Example
///
/// ```
/// use polybox::boxes;
///
/// let inner = boxes![4, 5];
/// let args = boxes![1, "two", 3.0, &inner];
///
/// assert_eq!(args.size(), 5);
/// assert!(args[1].is_type::<&str>());
/// ```
#[macro_export]
macro_rules! boxes {
    () => {
        $crate::Boxes::new()
    };
    ( $( $value: expr ),+ $(,)? ) => {{
        let mut boxes = $crate::Boxes::new();
        $( boxes.add($value); )+
        boxes
    }};
}

/// A sequence of boxes, typically a heterogeneous argument list.
#[derive(Clone, Default)]
pub struct Boxes<'a> {
    boxes: Vec<Boxed<'a>>,
}

/// A value that can be added to [`Boxes`].
///
/// Boxable values are boxed, a [`Boxed`] is added as one element and sequences of boxes add
/// their elements.
pub trait AddToBoxes<'a> {
    /// Appends `self` to `boxes`.
    fn add_to(self, boxes: &mut Boxes<'a>);
}

impl<'a> Boxes<'a> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Boxes { boxes: Vec::new() }
    }

    /// Creates an empty sequence with room for `capacity` boxes.
    pub fn with_capacity(capacity: usize) -> Self {
        Boxes {
            boxes: Vec::with_capacity(capacity),
        }
    }

    /// Appends `value`, flattening sequences of boxes by one level.
    ///
    /// ```
    /// use polybox::{Boxed, Boxes};
    ///
    /// let mut inner = Boxes::new();
    /// inner.add(4).add(5);
    ///
    /// let mut outer = Boxes::new();
    /// outer.add(Boxed::new('x')).add(&inner);
    /// assert_eq!(outer.size(), 3);
    /// ```
    pub fn add(&mut self, value: impl AddToBoxes<'a>) -> &mut Self {
        value.add_to(self);
        self
    }

    /// Removes all boxes.
    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    /// The number of boxes.
    pub fn size(&self) -> usize {
        self.boxes.len()
    }

    /// Reserves room for at least `additional` more boxes.
    pub fn reserve(&mut self, additional: usize) {
        self.boxes.reserve(additional);
    }

    /// Invokes `F` on every box, in order, through the global registry.
    ///
    /// `invoke` receives the box and the implementation found for it. Boxes without an
    /// implementation are skipped with a warning.
    pub fn call_all<F: Function>(&self, mut invoke: impl FnMut(&Boxed<'a>, F::Signature)) {
        for boxed in &self.boxes {
            boxed.call::<F, ()>(|function| invoke(boxed, function));
        }
    }
}

impl<'a> ops::Deref for Boxes<'a> {
    type Target = [Boxed<'a>];

    fn deref(&self) -> &[Boxed<'a>] {
        &self.boxes
    }
}

impl<'a> ops::DerefMut for Boxes<'a> {
    fn deref_mut(&mut self) -> &mut [Boxed<'a>] {
        &mut self.boxes
    }
}

impl<'a> Extend<Boxed<'a>> for Boxes<'a> {
    fn extend<I: IntoIterator<Item = Boxed<'a>>>(&mut self, iter: I) {
        self.boxes.extend(iter);
    }
}

impl<'a> FromIterator<Boxed<'a>> for Boxes<'a> {
    fn from_iter<I: IntoIterator<Item = Boxed<'a>>>(iter: I) -> Self {
        Boxes {
            boxes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for Boxes<'a> {
    type Item = Boxed<'a>;
    type IntoIter = vec::IntoIter<Boxed<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.into_iter()
    }
}

impl<'a, 'b> IntoIterator for &'b Boxes<'a> {
    type Item = &'b Boxed<'a>;
    type IntoIter = slice::Iter<'b, Boxed<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}

impl fmt::Debug for Boxes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.boxes).finish()
    }
}

impl<'a, T: Boxable<'a>> AddToBoxes<'a> for T {
    fn add_to(self, boxes: &mut Boxes<'a>) {
        boxes.boxes.push(Boxed::new(self));
    }
}

impl<'a> AddToBoxes<'a> for Boxed<'a> {
    fn add_to(self, boxes: &mut Boxes<'a>) {
        boxes.boxes.push(self);
    }
}

impl<'a> AddToBoxes<'a> for &Boxed<'a> {
    fn add_to(self, boxes: &mut Boxes<'a>) {
        boxes.boxes.push(*self);
    }
}

impl<'a> AddToBoxes<'a> for Boxes<'a> {
    fn add_to(self, boxes: &mut Boxes<'a>) {
        boxes.boxes.extend(self.boxes);
    }
}

impl<'a> AddToBoxes<'a> for &Boxes<'a> {
    fn add_to(self, boxes: &mut Boxes<'a>) {
        boxes.boxes.extend_from_slice(&self.boxes);
    }
}

impl<'a> AddToBoxes<'a> for &[Boxed<'a>] {
    fn add_to(self, boxes: &mut Boxes<'a>) {
        boxes.boxes.extend_from_slice(self);
    }
}
