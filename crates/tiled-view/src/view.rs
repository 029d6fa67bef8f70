//! Views over tiled memory, their ownership tracker, and tile sub-views.
//!
//! A [`View`] is a pointer, an offset mapping and a [`Tracker`]. Views alias
//! freely: cloning a view or binding a tile sub-view shares the memory, so
//! element access goes through raw pointers and is `unsafe`.

use std::fmt::{self, Debug};
use std::mem::ManuallyDrop;
use std::ptr::NonNull;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::checked::Checked;
use crate::error::Result;
use crate::layout::is_tiled_layout;
use crate::offset::{DenseTile, TileOffset, ViewOffset};

/// Heap storage owned by one or more views.
///
/// Elements are dropped and the buffer freed when the last
/// [`Tracker::Owned`] handle goes away.
pub struct Allocation<T> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
}

// SAFETY: `Allocation` owns its elements like a `Vec<T>` and may be
// released from whichever thread drops the last handle.
unsafe impl<T: Send + Sync> Send for Allocation<T> {}
unsafe impl<T: Send + Sync> Sync for Allocation<T> {}

impl<T> Allocation<T> {
    fn from_vec(vec: Vec<T>) -> Self {
        let mut vec = ManuallyDrop::new(vec);
        let len = vec.len();
        let cap = vec.capacity();
        // SAFETY: `Vec::as_mut_ptr` is never null, dangling for empty vectors.
        let ptr = unsafe { NonNull::new_unchecked(vec.as_mut_ptr()) };
        Allocation { ptr, len, cap }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Drop for Allocation<T> {
    fn drop(&mut self) {
        debug!(
            len = self.len,
            elem = std::any::type_name::<T>(),
            "releasing view allocation"
        );
        // SAFETY: the parts came from a `Vec<T>` that was never freed.
        unsafe { drop(Vec::from_raw_parts(self.ptr.as_ptr(), self.len, self.cap)) }
    }
}

impl<T> Debug for Allocation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocation")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

/// Whether a view shares responsibility for releasing its memory.
#[derive(Debug)]
pub enum Tracker<T> {
    /// Shares the allocation; the last holder releases it.
    Owned(Arc<Allocation<T>>),
    /// Aliases memory whose lifetime the caller manages.
    Unmanaged,
}

impl<T> Tracker<T> {
    pub fn is_managed(&self) -> bool {
        matches!(self, Tracker::Owned(_))
    }

    /// Number of live handles on the allocation; `0` when unmanaged.
    pub fn use_count(&self) -> usize {
        match self {
            Tracker::Owned(alloc) => Arc::strong_count(alloc),
            Tracker::Unmanaged => 0,
        }
    }
}

impl<T> Clone for Tracker<T> {
    fn clone(&self) -> Self {
        match self {
            Tracker::Owned(alloc) => Tracker::Owned(Arc::clone(alloc)),
            Tracker::Unmanaged => Tracker::Unmanaged,
        }
    }
}

/// A rank-2 view: data pointer, offset mapping and ownership tracker.
pub struct View<T, M> {
    ptr: *mut T,
    mapping: M,
    tracker: Tracker<T>,
}

/// A view using the tiled layout with `W x H` tiles.
pub type TiledView<T, const W: usize, const H: usize> = View<T, TileOffset<W, H>>;

/// A view over exactly one `W x H` tile, stored column-major.
pub type TileView<T, const W: usize, const H: usize> = View<T, DenseTile<W, H>>;

// SAFETY: the pointer is either into a shared `Allocation<T>` or memory the
// caller vouched for in `from_raw_parts`; dereferencing is always `unsafe`.
unsafe impl<T: Send + Sync, M: Send> Send for View<T, M> {}
unsafe impl<T: Send + Sync, M: Sync> Sync for View<T, M> {}

impl<T, M: ViewOffset> View<T, M> {
    /// Allocate `mapping.span()` elements, each a clone of `elem`.
    pub fn from_elem(mapping: M, elem: T) -> Self
    where
        T: Clone,
    {
        let span = mapping.span();
        let alloc = Allocation::from_vec(vec![elem; span]);
        debug!(
            span,
            elem = std::any::type_name::<T>(),
            tiled = is_tiled_layout::<M::Layout>(),
            "allocated view"
        );
        View {
            ptr: alloc.ptr.as_ptr(),
            mapping,
            tracker: Tracker::Owned(Arc::new(alloc)),
        }
    }

    /// Wrap memory the view does not own.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for `mapping.span()` elements for as long as the
    /// view, or any view derived from it, dereferences it.
    pub unsafe fn from_raw_parts(ptr: *mut T, mapping: M) -> Self {
        View {
            ptr,
            mapping,
            tracker: Tracker::Unmanaged,
        }
    }

    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    pub fn tracker(&self) -> &Tracker<T> {
        &self.tracker
    }

    pub fn is_managed(&self) -> bool {
        self.tracker.is_managed()
    }

    pub fn use_count(&self) -> usize {
        self.tracker.use_count()
    }

    pub fn is_tiled(&self) -> bool {
        is_tiled_layout::<M::Layout>()
    }

    pub fn extent(&self, axis: usize) -> usize {
        self.mapping.extent(axis)
    }

    pub fn size(&self) -> usize {
        self.mapping.size()
    }

    pub fn as_ptr(&self) -> *mut T {
        self.ptr
    }

    /// Pointer to element `(i0, i1)`. Indices are not checked.
    #[inline]
    pub fn ptr_at(&self, i0: usize, i1: usize) -> *mut T {
        self.ptr.wrapping_add(self.mapping.offset(i0, i1))
    }

    /// Pointer to element `(i0, i1)` after checking both indices.
    pub fn try_ptr_at(&self, i0: usize, i1: usize) -> Result<*mut T> {
        let offset = Checked::new(self.mapping).offset(i0, i1)?;
        Ok(self.ptr.wrapping_add(offset))
    }

    /// Read element `(i0, i1)`.
    ///
    /// # Safety
    ///
    /// The indices must be in bounds, the memory must be live and no other
    /// view may be writing the element concurrently.
    #[inline]
    pub unsafe fn read(&self, i0: usize, i1: usize) -> T
    where
        T: Copy,
    {
        self.ptr_at(i0, i1).read()
    }

    /// Write element `(i0, i1)`.
    ///
    /// # Safety
    ///
    /// Same as [`View::read`], and no other view may be accessing the
    /// element concurrently.
    #[inline]
    pub unsafe fn write(&self, i0: usize, i1: usize, value: T)
    where
        T: Copy,
    {
        self.ptr_at(i0, i1).write(value)
    }
}

impl<T, M: Clone> Clone for View<T, M> {
    fn clone(&self) -> Self {
        View {
            ptr: self.ptr,
            mapping: self.mapping.clone(),
            tracker: self.tracker.clone(),
        }
    }
}

impl<T, M: Debug> Debug for View<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("ptr", &self.ptr)
            .field("mapping", &self.mapping)
            .field("managed", &self.tracker.is_managed())
            .finish()
    }
}

// Tile sub-views

/// View tile `(t0, t1)` of `src` as a dense `W x H` block.
///
/// The result points into `src`'s memory. It shares `src`'s allocation when
/// `src` is managed and is unmanaged otherwise. Tile coordinates are not
/// checked; see [`try_tile_subview`].
///
/// The destination shape is fixed by the source layout, so a tile view of
/// the wrong shape is a type error:
///
/// ```compile_fail
/// use tiled_view::{assign_tile, DenseTile, TileOffset, TileView, TiledView, View};
///
/// let src: TiledView<f32, 4, 4> = View::from_elem(TileOffset::new(8, 8), 0.0);
/// let mut dst: TileView<f32, 4, 2> = View::from_elem(DenseTile::new(), 0.0);
/// assign_tile(&mut dst, &src, 0, 0);
/// ```
pub fn tile_subview<T, const W: usize, const H: usize>(
    src: &TiledView<T, W, H>,
    t0: usize,
    t1: usize,
) -> TileView<T, W, H> {
    let base = src.mapping.tile_begin(t0, t1);
    let tracker = src.tracker.clone();
    trace!(t0, t1, base, managed = tracker.is_managed(), "bound tile subview");
    View {
        ptr: src.ptr.wrapping_add(base),
        mapping: DenseTile::new(),
        tracker,
    }
}

/// Checked [`tile_subview`]: fails when `(t0, t1)` is outside the tile grid.
pub fn try_tile_subview<T, const W: usize, const H: usize>(
    src: &TiledView<T, W, H>,
    t0: usize,
    t1: usize,
) -> Result<TileView<T, W, H>> {
    Checked::new(src.mapping).tile_begin(t0, t1)?;
    Ok(tile_subview(src, t0, t1))
}

/// Rebind `dst` to tile `(t0, t1)` of `src`.
///
/// `dst` gives up whatever it held before; its ownership state becomes
/// `src`'s.
pub fn assign_tile<T, const W: usize, const H: usize>(
    dst: &mut TileView<T, W, H>,
    src: &TiledView<T, W, H>,
    t0: usize,
    t1: usize,
) {
    *dst = tile_subview(src, t0, t1);
}
