//! Minimal ELF traversal: just enough to find `.note.ident` and compare its
//! owner name against [`DGSH_NOTE_NAME`].
//!
//! This is not a general ELF parser. Only the section header table, the
//! section-name string table and the first note record of the matching
//! section are ever touched. Every read goes through [`ByteView`], which
//! validates `offset + size` against the buffer before dereferencing, so a
//! truncated or hostile file yields an [`ElfError`] instead of a bad read.
//!
//! The 32-bit and 64-bit variants differ only in field widths and offsets;
//! those live in the [`ElfLayout`] implementations and the search itself is
//! written once in [`find_dgsh_note`].

use std::marker::PhantomData;

use log::{debug, trace};
use thiserror::Error;

use crate::constants::{DGSH_NOTE_NAME, ELF_MAGIC, NOTE_SECTION_NAME};

/// Size of `e_ident`.
const IDENT_LEN: usize = 16;
const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;

/// `n_namesz`, `n_descsz`, `n_type`: three 32-bit words in both classes.
const NOTE_HEADER_LEN: u64 = 12;

/// Offset of `sh_name` inside a section header (same for both classes).
const SH_NAME: u64 = 0;

/// Error type for ELF inspection.
///
/// None of these reach callers of the boolean entry points; they are folded
/// into "not compatible" there and only surface through
/// [`crate::Detection`] for diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElfError {
    /// A read would run past the end of the buffer.
    #[error("read of {size} bytes at offset {offset:#x} exceeds buffer of {len} bytes")]
    OutOfBounds { offset: u64, size: usize, len: usize },

    /// The buffer does not start with `\x7fELF`.
    #[error("missing ELF magic")]
    BadMagic,

    /// `e_ident[EI_DATA]` is neither little- nor big-endian.
    #[error("unsupported ELF data encoding {0}")]
    UnsupportedEncoding(u8),

    /// A section index (typically `e_shstrndx`) is past the end of the table.
    #[error("section index {index} is outside the {count}-entry section table")]
    SectionIndex { index: u16, count: u16 },

    /// A section name runs to the end of the buffer without a terminator.
    #[error("unterminated section name at offset {0:#x}")]
    UnterminatedName(u64),
}

/// Convenience result type for ELF inspection.
pub type ElfResult<T> = Result<T, ElfError>;

/// Byte order declared by `e_ident[EI_DATA]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Architecture class declared by `e_ident[EI_CLASS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Elf32,
    Elf64,
    Unknown(u8),
}

impl ElfClass {
    pub fn from_ident(value: u8) -> Self {
        match value {
            1 => ElfClass::Elf32,
            2 => ElfClass::Elf64,
            other => ElfClass::Unknown(other),
        }
    }
}

/// Bounds-checked, endian-aware view over an immutable byte buffer.
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
    endian: Endian,
}

impl<'a> ByteView<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self { data, endian }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow `size` bytes starting at `offset`.
    pub fn bytes_at(&self, offset: u64, size: usize) -> ElfResult<&'a [u8]> {
        let range = usize::try_from(offset)
            .ok()
            .and_then(|start| start.checked_add(size).map(|end| start..end))
            .filter(|range| range.end <= self.data.len());
        match range {
            Some(range) => Ok(&self.data[range]),
            None => Err(ElfError::OutOfBounds { offset, size, len: self.data.len() }),
        }
    }

    fn array_at<const N: usize>(&self, offset: u64) -> ElfResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes_at(offset, N)?);
        Ok(out)
    }

    pub fn u16_at(&self, offset: u64) -> ElfResult<u16> {
        let raw = self.array_at(offset)?;
        Ok(match self.endian {
            Endian::Little => u16::from_le_bytes(raw),
            Endian::Big => u16::from_be_bytes(raw),
        })
    }

    pub fn u32_at(&self, offset: u64) -> ElfResult<u32> {
        let raw = self.array_at(offset)?;
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        })
    }

    pub fn u64_at(&self, offset: u64) -> ElfResult<u64> {
        let raw = self.array_at(offset)?;
        Ok(match self.endian {
            Endian::Little => u64::from_le_bytes(raw),
            Endian::Big => u64::from_be_bytes(raw),
        })
    }

    /// Borrow the NUL-terminated string at `offset`, without its terminator.
    pub fn cstr_at(&self, offset: u64) -> ElfResult<&'a [u8]> {
        let tail = usize::try_from(offset)
            .ok()
            .and_then(|start| self.data.get(start..))
            .ok_or(ElfError::OutOfBounds { offset, size: 1, len: self.data.len() })?;
        let end = tail.iter().position(|b| *b == 0).ok_or(ElfError::UnterminatedName(offset))?;
        Ok(&tail[..end])
    }
}

/// Parsed `e_ident` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfIdent {
    pub class: ElfClass,
    pub encoding: u8,
}

impl ElfIdent {
    /// Check the magic and read the class and data-encoding bytes.
    pub fn parse(buf: &[u8]) -> ElfResult<Self> {
        if !buf.starts_with(&ELF_MAGIC) {
            return Err(ElfError::BadMagic);
        }
        let ident = ByteView::new(buf, Endian::Little).bytes_at(0, IDENT_LEN)?;
        Ok(Self { class: ElfClass::from_ident(ident[EI_CLASS]), encoding: ident[EI_DATA] })
    }

    pub fn endian(&self) -> ElfResult<Endian> {
        match self.encoding {
            1 => Ok(Endian::Little),
            2 => Ok(Endian::Big),
            other => Err(ElfError::UnsupportedEncoding(other)),
        }
    }
}

/// Field widths and offsets of one ELF class.
///
/// Offsets are relative to the start of the file header (`E_*`) or of a
/// section header (`SH_*`).
pub trait ElfLayout {
    const CLASS: ElfClass;
    const HEADER_LEN: usize;
    const SECTION_HEADER_LEN: usize;
    const E_SHOFF: u64;
    const E_SHNUM: u64;
    const E_SHSTRNDX: u64;
    const SH_OFFSET: u64;

    /// Read an address/offset-sized word (`Elf32_Off` / `Elf64_Off`).
    fn read_word(view: &ByteView<'_>, offset: u64) -> ElfResult<u64>;
}

/// `ELFCLASS32` layout.
pub struct Elf32;

/// `ELFCLASS64` layout.
pub struct Elf64;

impl ElfLayout for Elf32 {
    const CLASS: ElfClass = ElfClass::Elf32;
    const HEADER_LEN: usize = 52;
    const SECTION_HEADER_LEN: usize = 40;
    const E_SHOFF: u64 = 0x20;
    const E_SHNUM: u64 = 0x30;
    const E_SHSTRNDX: u64 = 0x32;
    const SH_OFFSET: u64 = 0x10;

    fn read_word(view: &ByteView<'_>, offset: u64) -> ElfResult<u64> {
        view.u32_at(offset).map(u64::from)
    }
}

impl ElfLayout for Elf64 {
    const CLASS: ElfClass = ElfClass::Elf64;
    const HEADER_LEN: usize = 64;
    const SECTION_HEADER_LEN: usize = 64;
    const E_SHOFF: u64 = 0x28;
    const E_SHNUM: u64 = 0x3C;
    const E_SHSTRNDX: u64 = 0x3E;
    const SH_OFFSET: u64 = 0x18;

    fn read_word(view: &ByteView<'_>, offset: u64) -> ElfResult<u64> {
        view.u64_at(offset)
    }
}

/// The two section-header fields the search needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// `sh_name`: offset into the section-name string table.
    pub name: u32,
    /// `sh_offset`: file offset of the section contents.
    pub offset: u64,
}

/// Section header table whose full extent has been checked against the buffer.
pub struct SectionTable<'v, 'a, L> {
    view: &'v ByteView<'a>,
    base: u64,
    count: u16,
    _layout: PhantomData<L>,
}

impl<'v, 'a, L: ElfLayout> SectionTable<'v, 'a, L> {
    /// Locate the table from the file header and make sure every entry lies
    /// inside the buffer.
    pub fn read(view: &'v ByteView<'a>) -> ElfResult<Self> {
        view.bytes_at(0, L::HEADER_LEN)?;
        let base = L::read_word(view, L::E_SHOFF)?;
        let count = view.u16_at(L::E_SHNUM)?;
        view.bytes_at(base, usize::from(count) * L::SECTION_HEADER_LEN)?;
        Ok(Self { view, base, count, _layout: PhantomData })
    }

    pub fn len(&self) -> u16 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Read entry `index`. Indices past the table are rejected even when the
    /// bytes would still be inside the buffer.
    pub fn header(&self, index: u16) -> ElfResult<SectionHeader> {
        if index >= self.count {
            return Err(ElfError::SectionIndex { index, count: self.count });
        }
        let at = self.base + u64::from(index) * L::SECTION_HEADER_LEN as u64;
        Ok(SectionHeader {
            name: self.view.u32_at(at + SH_NAME)?,
            offset: L::read_word(self.view, at + L::SH_OFFSET)?,
        })
    }
}

/// Search the section table of an ELF file of layout `L` for a
/// `.note.ident` section whose first note is owned by dgsh.
pub fn find_dgsh_note<L: ElfLayout>(view: &ByteView<'_>) -> ElfResult<bool> {
    let table = SectionTable::<L>::read(view)?;
    if table.is_empty() {
        debug!("{:?}: no section headers", L::CLASS);
        return Ok(false);
    }

    let strtab = table.header(view.u16_at(L::E_SHSTRNDX)?)?.offset;

    for index in 0..table.len() {
        let section = table.header(index)?;
        let name_at = strtab.checked_add(u64::from(section.name)).ok_or(
            ElfError::OutOfBounds { offset: strtab, size: section.name as usize, len: view.len() },
        )?;
        if view.cstr_at(name_at)? != NOTE_SECTION_NAME {
            continue;
        }
        trace!("{:?}: .note.ident is section {index} at {:#x}", L::CLASS, section.offset);
        if note_is_dgsh(view, section.offset)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Compare the owner name of the note record at `offset` with
/// [`DGSH_NOTE_NAME`]; `n_namesz` has to match the full length exactly.
fn note_is_dgsh(view: &ByteView<'_>, offset: u64) -> ElfResult<bool> {
    let namesz = view.u32_at(offset)?;
    if namesz as usize != DGSH_NOTE_NAME.len() {
        trace!("note name size {namesz} does not match");
        return Ok(false);
    }
    let name_at = offset.checked_add(NOTE_HEADER_LEN).ok_or(ElfError::OutOfBounds {
        offset,
        size: NOTE_HEADER_LEN as usize,
        len: view.len(),
    })?;
    Ok(view.bytes_at(name_at, DGSH_NOTE_NAME.len())? == DGSH_NOTE_NAME)
}

/// Decide whether an ELF image carries the dgsh identification note.
///
/// An unrecognised class is a plain "no"; structural problems are errors.
pub fn has_dgsh_note(buf: &[u8]) -> ElfResult<bool> {
    let ident = ElfIdent::parse(buf)?;
    if let ElfClass::Unknown(class) = ident.class {
        debug!("unrecognised ELF class {class}");
        return Ok(false);
    }
    let view = ByteView::new(buf, ident.endian()?);
    match ident.class {
        ElfClass::Elf32 => find_dgsh_note::<Elf32>(&view),
        ElfClass::Elf64 => find_dgsh_note::<Elf64>(&view),
        ElfClass::Unknown(_) => Ok(false),
    }
}
