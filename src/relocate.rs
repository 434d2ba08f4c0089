/// Declares how values of a type travel between storage slots when an
/// [`Array`](crate::Array) grows or shifts its contents.
///
/// Two strategies exist:
///
/// - **Move**: a bitwise transfer. The source slot is abandoned and the
///   value continues its life at the destination. It cannot fail part-way,
///   so nothing ever needs to be rolled back.
/// - **Duplicate**: an independent copy is built at the destination and the
///   original is dropped once the whole relocation has succeeded. A failure
///   (panic) while duplicating leaves every source value untouched, so the
///   array can dispose of the partial destination and keep serving from the
///   old storage.
///
/// Ordinary Rust types set [`MOVE_NEVER_FAILS`](Relocate::MOVE_NEVER_FAILS)
/// to true; the crate ships such impls for primitives and common owning
/// types. Setting it to false forces the duplicate strategy and is meant
/// for types that must observe or veto silent transfer, for example
/// instrumented elements counting their copies. Types that cannot be
/// duplicated at all must declare `MOVE_NEVER_FAILS = true` and may leave
/// the provided method bodies alone.
pub trait Relocate: Sized {
    /// True when a bitwise move out of a slot is always acceptable for this
    /// type.
    const MOVE_NEVER_FAILS: bool;

    /// Builds an independent copy of the value for copy relocation.
    ///
    /// Only called when `MOVE_NEVER_FAILS` is false. May panic; the array
    /// treats a panic here as "the source is still intact" and rolls the
    /// operation back.
    fn duplicate(&self) -> Self {
        unreachable!("duplicate() called for a move-relocated type")
    }

    /// Copy-assignment into an already live value, used when shifting
    /// elements over one another in place.
    ///
    /// Only called when `MOVE_NEVER_FAILS` is false.
    fn duplicate_from(&mut self, source: &Self) {
        *self = source.duplicate();
    }
}

macro_rules! relocate_by_move {
    ($($t:ty),* $(,)?) => {
        $(
            impl Relocate for $t {
                const MOVE_NEVER_FAILS: bool = true;
            }
        )*
    }
}

relocate_by_move!(
    (), bool, char,
    u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, usize, isize,
    f32, f64,
    String,
);

impl<T> Relocate for Box<T> {
    const MOVE_NEVER_FAILS: bool = true;
}

impl<T> Relocate for Vec<T> {
    const MOVE_NEVER_FAILS: bool = true;
}

impl<T> Relocate for Option<T> where T: Relocate {
    const MOVE_NEVER_FAILS: bool = true;
}

impl<'a, T> Relocate for &'a T where T: ?Sized {
    const MOVE_NEVER_FAILS: bool = true;
}
