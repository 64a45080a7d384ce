//! Hand-authored content served when AI generation fails.

/// (question, options, correct index, explanation, topic)
pub type CannedQuestion = (&'static str, [&'static str; 4], usize, &'static str, &'static str);

pub const SAMPLE_QUESTIONS: &[CannedQuestion] = &[
    (
        "What is the time complexity of binary search on a sorted array of n elements?",
        ["O(n)", "O(log n)", "O(n log n)", "O(1)"],
        1,
        "Each comparison halves the remaining search space.",
        "Algorithms",
    ),
    (
        "Which data structure follows the Last-In-First-Out principle?",
        ["Queue", "Stack", "Linked list", "Heap"],
        1,
        "The most recently pushed element is the first one popped from a stack.",
        "Data Structures",
    ),
    (
        "Ohm's law relates which three quantities?",
        [
            "Voltage, current and resistance",
            "Power, energy and time",
            "Charge, capacitance and voltage",
            "Force, mass and acceleration",
        ],
        0,
        "V = I × R links voltage, current and resistance.",
        "Electrical Basics",
    ),
    (
        "Which normal form removes partial dependencies on a composite key?",
        ["First normal form", "Second normal form", "Third normal form", "Boyce-Codd normal form"],
        1,
        "2NF requires every non-key attribute to depend on the whole key.",
        "Databases",
    ),
    (
        "In thermodynamics, what does the first law state?",
        [
            "Entropy always decreases",
            "Energy is conserved",
            "Absolute zero is reachable",
            "Heat flows from cold to hot",
        ],
        1,
        "Energy can change form but is neither created nor destroyed.",
        "Thermodynamics",
    ),
    (
        "Which layer of the OSI model is responsible for routing packets between networks?",
        ["Data link", "Transport", "Network", "Session"],
        2,
        "The network layer (layer 3) handles logical addressing and routing.",
        "Computer Networks",
    ),
];

/// (title, summary, category, difficulty, read minutes, tags, fun fact)
pub type CannedCard = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    u32,
    &'static [&'static str],
    &'static str,
);

pub const CURATED_CARDS: &[CannedCard] = &[
    (
        "How Error-Correcting Codes Keep Your Files Intact",
        "Every QR code, SSD and deep-space probe relies on clever maths that repairs flipped bits without asking for a resend.",
        "technology",
        "intermediate",
        4,
        &["coding theory", "reliability"],
        "Voyager 1 still uses Reed-Solomon codes to send data from interstellar space.",
    ),
    (
        "Why Bridges Sway: Resonance in Structures",
        "When wind or footsteps match a structure's natural frequency, small pushes add up to big motions.",
        "engineering",
        "beginner",
        3,
        &["resonance", "civil engineering"],
        "London's Millennium Bridge closed two days after opening because pedestrians fell into step with its sway.",
    ),
    (
        "The Transistor: A Switch That Changed Everything",
        "Billions of tiny switches flipping billions of times per second are the reason computers exist.",
        "technology",
        "beginner",
        3,
        &["electronics", "history"],
        "The first transistor, built in 1947, was about the size of a palm.",
    ),
    (
        "Entropy and Why Your Coffee Gets Cold",
        "The second law of thermodynamics explains why heat spreads out and never spontaneously gathers back.",
        "science",
        "beginner",
        3,
        &["thermodynamics", "physics"],
        "The word entropy was coined by Rudolf Clausius in 1865 from the Greek for transformation.",
    ),
    (
        "Dijkstra's Algorithm in Your Maps App",
        "Finding the shortest route through a road network is a graph problem solved millions of times a day.",
        "computer science",
        "intermediate",
        5,
        &["graphs", "algorithms"],
        "Edsger Dijkstra designed the algorithm in about twenty minutes at a café in Amsterdam.",
    ),
    (
        "Lithium-Ion Batteries: Rocking-Chair Chemistry",
        "Lithium ions shuttle between two electrodes every time you charge or drain your phone.",
        "science",
        "intermediate",
        4,
        &["electrochemistry", "energy"],
        "The 2019 Nobel Prize in Chemistry was awarded for the development of lithium-ion batteries.",
    ),
    (
        "Public-Key Cryptography Explained with Padlocks",
        "Anyone can snap a padlock shut, but only the key holder can open it. That asymmetry secures the web.",
        "computer science",
        "beginner",
        4,
        &["cryptography", "security"],
        "RSA was published in 1977, but a British intelligence mathematician found the idea four years earlier.",
    ),
];

/// (heading, content template) where `{title}` is replaced with the topic.
pub const GENERIC_DETAIL_SECTIONS: &[(&str, &str)] = &[
    (
        "Overview",
        "{title} is a topic that connects fundamental principles with practical engineering. \
         Start by identifying the core problem it addresses and the constraints that shape it.",
    ),
    (
        "Key Concepts",
        "Break {title} into its building blocks: the definitions, the governing rules, and the \
         assumptions behind them. Working a small example by hand is the fastest way to make them stick.",
    ),
    (
        "Real-World Applications",
        "Look for {title} in systems you already use. Case studies and lab exercises show how the \
         theory holds up when real-world limits such as cost, noise and tolerances appear.",
    ),
    (
        "Going Further",
        "Textbook chapters, lecture notes and past exam questions on {title} are good next steps. \
         Try explaining the idea to a classmate to find the gaps in your understanding.",
    ),
];
