use std::collections::HashMap;

const RAM_SIZE: usize = 32768;

/// A minimal Hack machine: a two-pass symbolic loader plus an
/// instruction-level interpreter, enough to execute translated programs
/// and inspect the RAM they leave behind.
pub struct Machine {
    rom: Vec<Instruction>,
    ram: Vec<i16>,
    a: i16,
    d: i16,
    pc: usize,
}

#[derive(Debug, Clone, Copy)]
enum Instruction {
    Address(i16),
    Compute {
        comp: Comp,
        reads_memory: bool,
        dest_a: bool,
        dest_d: bool,
        dest_m: bool,
        jump_lt: bool,
        jump_eq: bool,
        jump_gt: bool,
    },
}

#[derive(Debug, Clone, Copy)]
enum Comp {
    Zero,
    One,
    NegOne,
    D,
    X,
    NotD,
    NotX,
    NegD,
    NegX,
    DPlusOne,
    XPlusOne,
    DMinusOne,
    XMinusOne,
    DPlusX,
    DMinusX,
    XMinusD,
    DAndX,
    DOrX,
}

impl Machine {
    pub fn load(program: &str) -> Self {
        let mut symbols = predefined_symbols();
        let mut lines = Vec::new();
        for raw in program.lines() {
            let line = strip(raw);
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
            {
                symbols.insert(name.to_string(), lines.len() as i16);
            } else {
                lines.push(line.to_string());
            }
        }

        let mut next_variable = 16;
        let mut rom = Vec::with_capacity(lines.len());
        for line in &lines {
            rom.push(parse_instruction(line, &mut symbols, &mut next_variable));
        }
        Self {
            rom,
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    /// Execute at most `max_steps` instructions and return how many ran.
    /// Falling off the end of the ROM stops early; a halt spin loop just
    /// burns the remaining budget without changing machine state.
    pub fn run(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps {
            if !self.step() {
                break;
            }
            steps += 1;
        }
        steps
    }

    fn step(&mut self) -> bool {
        let Some(&instruction) = self.rom.get(self.pc) else {
            return false;
        };
        self.pc += 1;
        match instruction {
            Instruction::Address(value) => self.a = value,
            Instruction::Compute {
                comp,
                reads_memory,
                dest_a,
                dest_d,
                dest_m,
                jump_lt,
                jump_eq,
                jump_gt,
            } => {
                let operand = if reads_memory { self.get(self.a) } else { self.a };
                let out = eval(comp, self.d, operand);
                // The memory write targets the address held in A before
                // the instruction; a taken jump uses A after any update.
                let address = self.a;
                if dest_m {
                    self.set(address, out);
                }
                if dest_a {
                    self.a = out;
                }
                if dest_d {
                    self.d = out;
                }
                let taken =
                    (out < 0 && jump_lt) || (out == 0 && jump_eq) || (out > 0 && jump_gt);
                if taken {
                    self.pc = self.a as u16 as usize;
                }
            }
        }
        true
    }

    pub fn sp(&self) -> i16 {
        self.get(0)
    }

    pub fn stack_top(&self) -> i16 {
        self.get(self.sp() - 1)
    }

    pub fn get(&self, address: i16) -> i16 {
        self.ram[address as u16 as usize]
    }

    fn set(&mut self, address: i16, value: i16) {
        self.ram[address as u16 as usize] = value;
    }
}

fn strip(raw: &str) -> &str {
    let without_comment = match raw.find("//") {
        Some(index) => &raw[..index],
        None => raw,
    };
    without_comment.trim()
}

fn predefined_symbols() -> HashMap<String, i16> {
    let mut symbols = HashMap::new();
    for (name, address) in [
        ("SP", 0),
        ("LCL", 1),
        ("ARG", 2),
        ("THIS", 3),
        ("THAT", 4),
        ("SCREEN", 16384),
        ("KBD", 24576),
    ] {
        symbols.insert(name.to_string(), address);
    }
    for index in 0..16 {
        symbols.insert(format!("R{index}"), index);
    }
    symbols
}

fn parse_instruction(
    line: &str,
    symbols: &mut HashMap<String, i16>,
    next_variable: &mut i16,
) -> Instruction {
    if let Some(target) = line.strip_prefix('@') {
        let value = if let Ok(number) = target.parse::<i16>() {
            number
        } else if let Some(&address) = symbols.get(target) {
            address
        } else {
            let address = *next_variable;
            symbols.insert(target.to_string(), address);
            *next_variable += 1;
            address
        };
        return Instruction::Address(value);
    }

    let (dest, rest) = match line.split_once('=') {
        Some((dest, rest)) => (dest, rest),
        None => ("", line),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, jump),
        None => (rest, ""),
    };
    let (comp, reads_memory) =
        parse_comp(comp).unwrap_or_else(|| panic!("invalid instruction: {line}"));
    let (jump_lt, jump_eq, jump_gt) = parse_jump(jump, line);
    Instruction::Compute {
        comp,
        reads_memory,
        dest_a: dest.contains('A'),
        dest_d: dest.contains('D'),
        dest_m: dest.contains('M'),
        jump_lt,
        jump_eq,
        jump_gt,
    }
}

fn parse_comp(comp: &str) -> Option<(Comp, bool)> {
    let reads_memory = comp.contains('M');
    let normalized = if reads_memory {
        comp.replace('M', "A")
    } else {
        comp.to_string()
    };
    let comp = match normalized.as_str() {
        "0" => Comp::Zero,
        "1" => Comp::One,
        "-1" => Comp::NegOne,
        "D" => Comp::D,
        "A" => Comp::X,
        "!D" => Comp::NotD,
        "!A" => Comp::NotX,
        "-D" => Comp::NegD,
        "-A" => Comp::NegX,
        "D+1" => Comp::DPlusOne,
        "A+1" => Comp::XPlusOne,
        "D-1" => Comp::DMinusOne,
        "A-1" => Comp::XMinusOne,
        "D+A" => Comp::DPlusX,
        "D-A" => Comp::DMinusX,
        "A-D" => Comp::XMinusD,
        "D&A" => Comp::DAndX,
        "D|A" => Comp::DOrX,
        _ => return None,
    };
    Some((comp, reads_memory))
}

fn parse_jump(jump: &str, line: &str) -> (bool, bool, bool) {
    match jump {
        "" => (false, false, false),
        "JGT" => (false, false, true),
        "JEQ" => (false, true, false),
        "JGE" => (false, true, true),
        "JLT" => (true, false, false),
        "JNE" => (true, false, true),
        "JLE" => (true, true, false),
        "JMP" => (true, true, true),
        _ => panic!("invalid instruction: {line}"),
    }
}

fn eval(comp: Comp, d: i16, x: i16) -> i16 {
    match comp {
        Comp::Zero => 0,
        Comp::One => 1,
        Comp::NegOne => -1,
        Comp::D => d,
        Comp::X => x,
        Comp::NotD => !d,
        Comp::NotX => !x,
        Comp::NegD => d.wrapping_neg(),
        Comp::NegX => x.wrapping_neg(),
        Comp::DPlusOne => d.wrapping_add(1),
        Comp::XPlusOne => x.wrapping_add(1),
        Comp::DMinusOne => d.wrapping_sub(1),
        Comp::XMinusOne => x.wrapping_sub(1),
        Comp::DPlusX => d.wrapping_add(x),
        Comp::DMinusX => d.wrapping_sub(x),
        Comp::XMinusD => x.wrapping_sub(d),
        Comp::DAndX => d & x,
        Comp::DOrX => d | x,
    }
}
