//! Hand-built ELF images for detector tests.
//!
//! Layout: file header, section contents, `.shstrtab`, then the section header
//! table. Entry 0 is the null section and the last entry is `.shstrtab`, so
//! user sections occupy table indices `1..=n`.

#![allow(dead_code)]

pub const DGSH_OWNER: &[u8] = b"DSpinellis/dgsh\0";

const SHT_PROGBITS: u64 = 1;
const SHT_STRTAB: u64 = 3;
const SHT_NOTE: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Elf32,
    Elf64,
}

impl Class {
    fn header_len(self) -> usize {
        match self {
            Class::Elf32 => 52,
            Class::Elf64 => 64,
        }
    }

    fn section_header_len(self) -> usize {
        match self {
            Class::Elf32 => 40,
            Class::Elf64 => 64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElfBuilder {
    class: Class,
    big_endian: bool,
    sections: Vec<(Vec<u8>, Vec<u8>)>,
    class_byte: Option<u8>,
    data_byte: Option<u8>,
    shoff: Option<u64>,
    shnum: Option<u16>,
    shstrndx: Option<u16>,
    section_offsets: Vec<(usize, u64)>,
}

impl ElfBuilder {
    pub fn new(class: Class) -> Self {
        Self {
            class,
            big_endian: false,
            sections: Vec::new(),
            class_byte: None,
            data_byte: None,
            shoff: None,
            shnum: None,
            shstrndx: None,
            section_offsets: Vec::new(),
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn section(mut self, name: &str, data: Vec<u8>) -> Self {
        self.sections.push((name.as_bytes().to_vec(), data));
        self
    }

    /// Add a `.note.ident` section holding one note owned by `owner`.
    pub fn ident_note(self, owner: &[u8]) -> Self {
        let note = note(owner, b"1.0\0", 1, self.big_endian);
        self.section(".note.ident", note)
    }

    pub fn class_byte(mut self, value: u8) -> Self {
        self.class_byte = Some(value);
        self
    }

    pub fn data_byte(mut self, value: u8) -> Self {
        self.data_byte = Some(value);
        self
    }

    pub fn section_header_offset(mut self, value: u64) -> Self {
        self.shoff = Some(value);
        self
    }

    pub fn section_count(mut self, value: u16) -> Self {
        self.shnum = Some(value);
        self
    }

    pub fn string_table_index(mut self, value: u16) -> Self {
        self.shstrndx = Some(value);
        self
    }

    /// Override `sh_offset` of table entry `index` (user sections start at 1).
    pub fn section_offset(mut self, index: usize, value: u64) -> Self {
        self.section_offsets.push((index, value));
        self
    }

    fn put(&self, out: &mut [u8], at: usize, value: u64, width: usize) {
        let bytes = if self.big_endian {
            value.to_be_bytes()[8 - width..].to_vec()
        } else {
            value.to_le_bytes()[..width].to_vec()
        };
        out[at..at + width].copy_from_slice(&bytes);
    }

    pub fn build(&self) -> Vec<u8> {
        let class = self.class;
        let word = match class {
            Class::Elf32 => 4,
            Class::Elf64 => 8,
        };

        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for (name, _) in &self.sections {
            name_offsets.push(shstrtab.len() as u64);
            shstrtab.extend_from_slice(name);
            shstrtab.push(0);
        }
        let shstrtab_name = shstrtab.len() as u64;
        shstrtab.extend_from_slice(b".shstrtab\0");

        let mut out = vec![0u8; class.header_len()];
        let mut entries = Vec::new();
        for ((name, data), name_off) in self.sections.iter().zip(&name_offsets) {
            pad_to(&mut out, 4);
            let sh_type = if name.starts_with(b".note") { SHT_NOTE } else { SHT_PROGBITS };
            entries.push((*name_off, sh_type, out.len() as u64, data.len() as u64));
            out.extend_from_slice(data);
        }
        pad_to(&mut out, 4);
        entries.push((shstrtab_name, SHT_STRTAB, out.len() as u64, shstrtab.len() as u64));
        out.extend_from_slice(&shstrtab);

        pad_to(&mut out, 8);
        let shoff = out.len();
        let count = entries.len() + 1;
        out.resize(shoff + count * class.section_header_len(), 0);

        for (i, (name, sh_type, offset, size)) in entries.iter().enumerate() {
            let index = i + 1;
            let offset = self
                .section_offsets
                .iter()
                .find(|(at, _)| *at == index)
                .map(|(_, value)| *value)
                .unwrap_or(*offset);
            let at = shoff + index * class.section_header_len();
            self.put(&mut out, at, *name, 4);
            self.put(&mut out, at + 4, *sh_type, 4);
            match class {
                Class::Elf32 => {
                    self.put(&mut out, at + 0x10, offset, 4);
                    self.put(&mut out, at + 0x14, *size, 4);
                }
                Class::Elf64 => {
                    self.put(&mut out, at + 0x18, offset, 8);
                    self.put(&mut out, at + 0x20, *size, 8);
                }
            }
        }

        out[..4].copy_from_slice(b"\x7fELF");
        out[4] = self.class_byte.unwrap_or(match class {
            Class::Elf32 => 1,
            Class::Elf64 => 2,
        });
        out[5] = self.data_byte.unwrap_or(if self.big_endian { 2 } else { 1 });
        out[6] = 1;
        self.put(&mut out, 16, 2, 2);
        self.put(&mut out, 20, 1, 4);

        let (e_shoff, e_ehsize, e_shentsize, e_shnum, e_shstrndx) = match class {
            Class::Elf32 => (0x20, 0x28, 0x2E, 0x30, 0x32),
            Class::Elf64 => (0x28, 0x34, 0x3A, 0x3C, 0x3E),
        };
        self.put(&mut out, e_shoff, self.shoff.unwrap_or(shoff as u64), word);
        self.put(&mut out, e_ehsize, class.header_len() as u64, 2);
        self.put(&mut out, e_shentsize, class.section_header_len() as u64, 2);
        self.put(&mut out, e_shnum, u64::from(self.shnum.unwrap_or(count as u16)), 2);
        self.put(&mut out, e_shstrndx, u64::from(self.shstrndx.unwrap_or((count - 1) as u16)), 2);
        out
    }
}

fn pad_to(out: &mut Vec<u8>, align: usize) {
    while out.len() % align != 0 {
        out.push(0);
    }
}

/// Encode one note record: header, owner name and descriptor, each padded to 4.
pub fn note(owner: &[u8], desc: &[u8], n_type: u32, big_endian: bool) -> Vec<u8> {
    let word = |value: u32| if big_endian { value.to_be_bytes() } else { value.to_le_bytes() };
    let mut out = Vec::new();
    out.extend_from_slice(&word(owner.len() as u32));
    out.extend_from_slice(&word(desc.len() as u32));
    out.extend_from_slice(&word(n_type));
    out.extend_from_slice(owner);
    pad_to(&mut out, 4);
    out.extend_from_slice(desc);
    pad_to(&mut out, 4);
    out
}

/// A dgsh-compatible image of the given class and byte order.
pub fn dgsh_elf(class: Class, big_endian: bool) -> Vec<u8> {
    let builder = ElfBuilder::new(class);
    let builder = if big_endian { builder.big_endian() } else { builder };
    builder
        .section(".text", vec![0xC3; 16])
        .ident_note(DGSH_OWNER)
        .section(".comment", b"GCC: (GNU) 13.2.0\0".to_vec())
        .build()
}
