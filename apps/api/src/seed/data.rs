//! Reference data loaded by `campus seed`.

pub struct BranchSeed {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub struct SubjectSeed {
    pub branch_code: &'static str,
    pub subject_code: &'static str,
    pub subject_name: &'static str,
    pub semester: i32,
    pub credits: i32,
    pub is_core: bool,
    pub prerequisites: &'static [&'static str],
    pub units: &'static [&'static str],
}

pub struct PaperSeed {
    pub paper_id: &'static str,
    pub branch_code: &'static str,
    pub subject_code: &'static str,
    pub university: &'static str,
    pub exam_year: i32,
    pub exam_type: &'static str,
    pub pdf_url: Option<&'static str>,
    /// (question, marks)
    pub questions: &'static [(&'static str, i32)],
    pub difficulty: &'static str,
    pub total_marks: i32,
    pub duration_minutes: i32,
}

pub struct MockQuestionSeed {
    pub question: &'static str,
    pub options: &'static [&'static str],
    pub correct_answer: usize,
    pub marks: u32,
}

pub struct MockExamSeed {
    pub exam_id: &'static str,
    pub title: &'static str,
    pub branch_code: &'static str,
    pub subject_code: &'static str,
    pub source_years: &'static [i32],
    pub questions: &'static [MockQuestionSeed],
    pub duration_minutes: i32,
}

pub const SEED_AUTHOR: &str = "seed@campus-lms.app";
pub const UNIVERSITY: &str = "State Technical University";

pub const BRANCHES: &[BranchSeed] = &[
    BranchSeed {
        code: "CSE",
        name: "Computer Science and Engineering",
        description: "Algorithms, software systems, and the theory of computation.",
    },
    BranchSeed {
        code: "ECE",
        name: "Electronics and Communication Engineering",
        description: "Analog and digital electronics, signals, and communication systems.",
    },
    BranchSeed {
        code: "ME",
        name: "Mechanical Engineering",
        description: "Mechanics, thermal sciences, and manufacturing.",
    },
    BranchSeed {
        code: "CE",
        name: "Civil Engineering",
        description: "Structures, surveying, and construction materials.",
    },
    BranchSeed {
        code: "EE",
        name: "Electrical Engineering",
        description: "Circuits, machines, and power systems.",
    },
    BranchSeed {
        code: "IT",
        name: "Information Technology",
        description: "Networks, web platforms, and information systems.",
    },
];

pub const SUBJECTS: &[SubjectSeed] = &[
    SubjectSeed {
        branch_code: "CSE",
        subject_code: "CS101",
        subject_name: "Programming Fundamentals",
        semester: 1,
        credits: 4,
        is_core: true,
        prerequisites: &[],
        units: &["Variables and types", "Control flow", "Functions", "Arrays and strings", "Pointers"],
    },
    SubjectSeed {
        branch_code: "CSE",
        subject_code: "CS201",
        subject_name: "Data Structures",
        semester: 3,
        credits: 4,
        is_core: true,
        prerequisites: &["CS101"],
        units: &["Linked lists", "Stacks and queues", "Trees", "Graphs", "Hashing"],
    },
    SubjectSeed {
        branch_code: "CSE",
        subject_code: "CS202",
        subject_name: "Database Management Systems",
        semester: 4,
        credits: 4,
        is_core: true,
        prerequisites: &["CS201"],
        units: &["ER modelling", "Relational algebra", "SQL", "Normalization", "Transactions"],
    },
    SubjectSeed {
        branch_code: "CSE",
        subject_code: "CS301",
        subject_name: "Operating Systems",
        semester: 5,
        credits: 4,
        is_core: true,
        prerequisites: &["CS201"],
        units: &["Processes", "Scheduling", "Synchronization", "Memory management", "File systems"],
    },
    SubjectSeed {
        branch_code: "ECE",
        subject_code: "EC101",
        subject_name: "Basic Electronics",
        semester: 1,
        credits: 3,
        is_core: true,
        prerequisites: &[],
        units: &["Semiconductors", "Diodes", "Transistors", "Amplifiers"],
    },
    SubjectSeed {
        branch_code: "ECE",
        subject_code: "EC201",
        subject_name: "Signals and Systems",
        semester: 3,
        credits: 4,
        is_core: true,
        prerequisites: &["EC101"],
        units: &["Signal classification", "LTI systems", "Fourier series", "Laplace transform", "Z-transform"],
    },
    SubjectSeed {
        branch_code: "ECE",
        subject_code: "EC202",
        subject_name: "Digital Logic Design",
        semester: 3,
        credits: 4,
        is_core: true,
        prerequisites: &["EC101"],
        units: &["Number systems", "Boolean algebra", "Combinational circuits", "Sequential circuits"],
    },
    SubjectSeed {
        branch_code: "ME",
        subject_code: "ME101",
        subject_name: "Engineering Mechanics",
        semester: 1,
        credits: 4,
        is_core: true,
        prerequisites: &[],
        units: &["Force systems", "Equilibrium", "Friction", "Kinematics", "Kinetics"],
    },
    SubjectSeed {
        branch_code: "ME",
        subject_code: "ME201",
        subject_name: "Thermodynamics",
        semester: 3,
        credits: 4,
        is_core: true,
        prerequisites: &["ME101"],
        units: &["Basic concepts", "First law", "Second law", "Entropy", "Power cycles"],
    },
    SubjectSeed {
        branch_code: "ME",
        subject_code: "ME202",
        subject_name: "Fluid Mechanics",
        semester: 4,
        credits: 3,
        is_core: true,
        prerequisites: &["ME101"],
        units: &["Fluid statics", "Kinematics of flow", "Bernoulli equation", "Viscous flow"],
    },
    SubjectSeed {
        branch_code: "CE",
        subject_code: "CE101",
        subject_name: "Surveying",
        semester: 2,
        credits: 3,
        is_core: true,
        prerequisites: &[],
        units: &["Chain surveying", "Compass surveying", "Levelling", "Theodolite"],
    },
    SubjectSeed {
        branch_code: "CE",
        subject_code: "CE201",
        subject_name: "Structural Analysis",
        semester: 4,
        credits: 4,
        is_core: true,
        prerequisites: &["CE101"],
        units: &["Determinate structures", "Influence lines", "Deflection", "Indeterminate structures"],
    },
    SubjectSeed {
        branch_code: "EE",
        subject_code: "EE101",
        subject_name: "Circuit Theory",
        semester: 2,
        credits: 4,
        is_core: true,
        prerequisites: &[],
        units: &["Network laws", "Network theorems", "AC circuits", "Transients"],
    },
    SubjectSeed {
        branch_code: "EE",
        subject_code: "EE201",
        subject_name: "Electrical Machines",
        semester: 4,
        credits: 4,
        is_core: true,
        prerequisites: &["EE101"],
        units: &["Transformers", "DC machines", "Induction motors", "Synchronous machines"],
    },
    SubjectSeed {
        branch_code: "IT",
        subject_code: "IT201",
        subject_name: "Web Technologies",
        semester: 3,
        credits: 3,
        is_core: false,
        prerequisites: &[],
        units: &["HTTP", "HTML and CSS", "JavaScript", "Server-side programming"],
    },
    SubjectSeed {
        branch_code: "IT",
        subject_code: "IT202",
        subject_name: "Computer Networks",
        semester: 4,
        credits: 4,
        is_core: true,
        prerequisites: &[],
        units: &["Layered models", "Data link layer", "Routing", "Transport layer", "Application layer"],
    },
];

pub const PAPERS: &[PaperSeed] = &[
    PaperSeed {
        paper_id: "CSE-CS201-2023-END",
        branch_code: "CSE",
        subject_code: "CS201",
        university: UNIVERSITY,
        exam_year: 2023,
        exam_type: "end-semester",
        pdf_url: Some("/papers/cse-cs201-2023-end.pdf"),
        questions: &[
            ("Compare arrays and linked lists for insertion and random access.", 10),
            ("Convert the infix expression (A+B)*(C-D) to postfix using a stack.", 10),
            ("Insert 50, 30, 70, 20, 40, 60, 80 into an empty BST and give its inorder traversal.", 15),
            ("Explain Dijkstra's algorithm and state its time complexity with a binary heap.", 15),
            ("Describe open addressing and separate chaining for collision resolution.", 10),
            ("Write an algorithm to detect a cycle in a directed graph.", 10),
        ],
        difficulty: "medium",
        total_marks: 70,
        duration_minutes: 180,
    },
    PaperSeed {
        paper_id: "CSE-CS202-2022-END",
        branch_code: "CSE",
        subject_code: "CS202",
        university: UNIVERSITY,
        exam_year: 2022,
        exam_type: "end-semester",
        pdf_url: Some("/papers/cse-cs202-2022-end.pdf"),
        questions: &[
            ("Draw an ER diagram for a library management system.", 15),
            ("Normalize the given relation to BCNF, showing each step.", 15),
            ("Write SQL to list departments whose average salary exceeds the company average.", 10),
            ("Explain conflict serializability with an example schedule.", 15),
            ("Describe the ARIES recovery algorithm.", 15),
        ],
        difficulty: "hard",
        total_marks: 70,
        duration_minutes: 180,
    },
    PaperSeed {
        paper_id: "ECE-EC201-2023-MID",
        branch_code: "ECE",
        subject_code: "EC201",
        university: UNIVERSITY,
        exam_year: 2023,
        exam_type: "mid-semester",
        pdf_url: None,
        questions: &[
            ("Classify x(t) = e^(-2t)u(t) as energy or power signal.", 5),
            ("Determine whether y(n) = n x(n) is time-invariant.", 5),
            ("Find the Fourier series of a square wave with period T.", 10),
            ("Compute the convolution of u(t) with e^(-t)u(t).", 10),
        ],
        difficulty: "medium",
        total_marks: 30,
        duration_minutes: 90,
    },
    PaperSeed {
        paper_id: "ME-ME201-2023-END",
        branch_code: "ME",
        subject_code: "ME201",
        university: UNIVERSITY,
        exam_year: 2023,
        exam_type: "end-semester",
        pdf_url: Some("/papers/me-me201-2023-end.pdf"),
        questions: &[
            ("State the zeroth law of thermodynamics and its significance.", 5),
            ("Apply the first law to a steady-flow nozzle and derive the exit velocity.", 15),
            ("Prove that entropy of an isolated system never decreases.", 15),
            ("Compare the Otto and Diesel cycles for the same compression ratio.", 15),
            ("Calculate the efficiency of a Carnot engine operating between 600 K and 300 K.", 10),
            ("Explain the Clausius inequality.", 10),
        ],
        difficulty: "medium",
        total_marks: 70,
        duration_minutes: 180,
    },
];

pub const MOCK_EXAMS: &[MockExamSeed] = &[
    MockExamSeed {
        exam_id: "MOCK-CSE-CS201-01",
        title: "Data Structures: Mock Exam 1",
        branch_code: "CSE",
        subject_code: "CS201",
        source_years: &[2021, 2022, 2023],
        questions: &[
            MockQuestionSeed {
                question: "Which data structure backs a breadth-first search?",
                options: &["Stack", "Queue", "Heap", "Trie"],
                correct_answer: 1,
                marks: 2,
            },
            MockQuestionSeed {
                question: "What is the worst-case height of a BST with n nodes?",
                options: &["log n", "n / 2", "n - 1", "sqrt n"],
                correct_answer: 2,
                marks: 2,
            },
            MockQuestionSeed {
                question: "Average lookup cost in a hash table with a good hash function is:",
                options: &["O(1)", "O(log n)", "O(n)", "O(n log n)"],
                correct_answer: 0,
                marks: 2,
            },
            MockQuestionSeed {
                question: "Which traversal of a BST yields keys in sorted order?",
                options: &["Preorder", "Postorder", "Level order", "Inorder"],
                correct_answer: 3,
                marks: 2,
            },
            MockQuestionSeed {
                question: "Dijkstra's algorithm fails when the graph has:",
                options: &["Cycles", "Negative edge weights", "Self loops", "More than 1000 vertices"],
                correct_answer: 1,
                marks: 4,
            },
        ],
        duration_minutes: 20,
    },
    MockExamSeed {
        exam_id: "MOCK-ECE-EC202-01",
        title: "Digital Logic Design: Mock Exam 1",
        branch_code: "ECE",
        subject_code: "EC202",
        source_years: &[2022, 2023],
        questions: &[
            MockQuestionSeed {
                question: "The binary equivalent of decimal 13 is:",
                options: &["1011", "1101", "1110", "1001"],
                correct_answer: 1,
                marks: 1,
            },
            MockQuestionSeed {
                question: "Which gate is functionally complete on its own?",
                options: &["AND", "OR", "NAND", "XOR"],
                correct_answer: 2,
                marks: 2,
            },
            MockQuestionSeed {
                question: "A 4-to-1 multiplexer needs how many select lines?",
                options: &["1", "2", "3", "4"],
                correct_answer: 1,
                marks: 2,
            },
            MockQuestionSeed {
                question: "Which flip-flop toggles when both inputs are 1?",
                options: &["SR", "D", "JK", "Latch"],
                correct_answer: 2,
                marks: 2,
            },
            MockQuestionSeed {
                question: "A mod-10 counter requires at least how many flip-flops?",
                options: &["3", "4", "5", "10"],
                correct_answer: 1,
                marks: 3,
            },
        ],
        duration_minutes: 15,
    },
];

/// Names of the subjects belonging to `branch_code`, in seed order.
pub fn subject_names(branch_code: &str) -> Vec<String> {
    SUBJECTS
        .iter()
        .filter(|s| s.branch_code == branch_code)
        .map(|s| s.subject_name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn natural_keys_are_unique() {
        let branches: HashSet<_> = BRANCHES.iter().map(|b| b.code).collect();
        assert_eq!(branches.len(), BRANCHES.len());

        let subjects: HashSet<_> = SUBJECTS.iter().map(|s| (s.branch_code, s.subject_code)).collect();
        assert_eq!(subjects.len(), SUBJECTS.len());

        let papers: HashSet<_> = PAPERS.iter().map(|p| p.paper_id).collect();
        assert_eq!(papers.len(), PAPERS.len());

        let exams: HashSet<_> = MOCK_EXAMS.iter().map(|e| e.exam_id).collect();
        assert_eq!(exams.len(), MOCK_EXAMS.len());
    }

    #[test]
    fn references_point_at_seeded_rows() {
        let branches: HashSet<_> = BRANCHES.iter().map(|b| b.code).collect();
        let subjects: HashSet<_> = SUBJECTS.iter().map(|s| (s.branch_code, s.subject_code)).collect();
        for s in SUBJECTS {
            assert!(branches.contains(s.branch_code), "{}", s.subject_code);
            assert!((1..=8).contains(&s.semester), "{}", s.subject_code);
        }
        for p in PAPERS {
            assert!(subjects.contains(&(p.branch_code, p.subject_code)), "{}", p.paper_id);
        }
        for e in MOCK_EXAMS {
            assert!(subjects.contains(&(e.branch_code, e.subject_code)), "{}", e.exam_id);
        }
        for b in BRANCHES {
            assert!(!subject_names(b.code).is_empty(), "{} has no subjects", b.code);
        }
    }

    #[test]
    fn branch_subjects_are_listed_by_name() {
        let names = subject_names("CSE");
        assert!(names.iter().any(|n| n == "Data Structures"));
        assert!(SUBJECTS
            .iter()
            .filter(|s| s.branch_code == "CSE")
            .all(|s| !names.iter().any(|n| n == s.subject_code)));
        assert!(subject_names("NOPE").is_empty());
    }

    #[test]
    fn paper_marks_add_up() {
        for p in PAPERS {
            let sum: i32 = p.questions.iter().map(|(_, marks)| marks).sum();
            assert_eq!(sum, p.total_marks, "{}", p.paper_id);
        }
    }

    #[test]
    fn mock_answers_are_valid_options() {
        for e in MOCK_EXAMS {
            assert!(!e.questions.is_empty());
            for q in e.questions {
                assert!(q.correct_answer < q.options.len(), "{}: {}", e.exam_id, q.question);
            }
        }
    }
}
