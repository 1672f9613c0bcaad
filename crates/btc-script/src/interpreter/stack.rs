//! Script execution stack.

use super::error::{InterpreterError, InterpreterErrorCode};

/// Largest number of items the stack may hold.
pub const MAX_STACK_SIZE: usize = 1000;

/// Interpret stack bytes as a boolean: any non-zero byte is true, except a
/// trailing 0x80 (negative zero).
pub fn as_bool(t: &[u8]) -> bool {
    match t.iter().position(|b| *b != 0) {
        None => false,
        Some(i) => !(i == t.len() - 1 && t[i] == 0x80),
    }
}

pub fn from_bool(v: bool) -> Vec<u8> {
    if v {
        vec![1]
    } else {
        vec![]
    }
}

/// The main data stack.
#[derive(Debug, Default)]
pub struct Stack {
    stk: Vec<Vec<u8>>,
}

impl Stack {
    pub fn new() -> Self {
        Stack { stk: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.stk.len()
    }

    pub fn push(&mut self, data: Vec<u8>) -> Result<(), InterpreterError> {
        if self.stk.len() >= MAX_STACK_SIZE {
            return Err(InterpreterError::new(
                InterpreterErrorCode::StackOverflow,
                format!("stack size exceeds {}", MAX_STACK_SIZE),
            ));
        }
        self.stk.push(data);
        Ok(())
    }

    pub fn push_bool(&mut self, val: bool) -> Result<(), InterpreterError> {
        self.push(from_bool(val))
    }

    pub fn pop(&mut self) -> Result<Vec<u8>, InterpreterError> {
        self.stk.pop().ok_or_else(|| {
            InterpreterError::new(
                InterpreterErrorCode::InvalidStackOperation,
                "pop from empty stack",
            )
        })
    }

    pub fn pop_bool(&mut self) -> Result<bool, InterpreterError> {
        Ok(as_bool(&self.pop()?))
    }

    /// Item `idx` positions below the top (0 is the top).
    pub fn peek(&self, idx: usize) -> Result<&[u8], InterpreterError> {
        let sz = self.stk.len();
        if idx >= sz {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidStackOperation,
                format!("index {} is invalid for stack size {}", idx, sz),
            ));
        }
        Ok(&self.stk[sz - idx - 1])
    }

    pub fn swap_top(&mut self) -> Result<(), InterpreterError> {
        let sz = self.stk.len();
        if sz < 2 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidStackOperation,
                format!("swap needs 2 items, stack has {}", sz),
            ));
        }
        self.stk.swap(sz - 1, sz - 2);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_bool() {
        assert!(!as_bool(&[]));
        assert!(!as_bool(&[0x00]));
        assert!(!as_bool(&[0x00, 0x00]));
        assert!(!as_bool(&[0x80]));
        assert!(!as_bool(&[0x00, 0x80]));
        assert!(as_bool(&[0x01]));
        assert!(as_bool(&[0x80, 0x00]));
        assert!(as_bool(&[0x01, 0x80]));
    }

    #[test]
    fn test_push_pop_peek() {
        let mut stack = Stack::new();
        stack.push(vec![1]).unwrap();
        stack.push(vec![2]).unwrap();
        assert_eq!(stack.peek(0).unwrap(), &[2]);
        assert_eq!(stack.peek(1).unwrap(), &[1]);
        assert!(stack.peek(2).is_err());
        stack.swap_top().unwrap();
        assert_eq!(stack.pop().unwrap(), vec![1]);
        assert_eq!(stack.pop().unwrap(), vec![2]);
        assert!(stack.pop().is_err());
    }

    #[test]
    fn test_overflow() {
        let mut stack = Stack::new();
        for _ in 0..MAX_STACK_SIZE {
            stack.push(vec![]).unwrap();
        }
        let err = stack.push(vec![]).unwrap_err();
        assert_eq!(err.code, InterpreterErrorCode::StackOverflow);
    }
}
