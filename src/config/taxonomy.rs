use serde::{Deserialize, Serialize};
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::path::PathBuf;

/// 科目下的一个知识点（主题）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Topic {
    pub id: String,
    pub label: String,
    pub keywords: Vec<String>,
}

/// 一个科目：自身关键词 + 按声明顺序排列的主题列表
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Subject {
    pub id: String,
    pub label: String,
    pub keywords: Vec<String>,
    pub topics: Vec<Topic>,
}

/// GATE 科目/主题分类表。加载一次后只读，显式传入各流水线阶段
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Taxonomy {
    pub subjects: Vec<Subject>,
}

impl Taxonomy {
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from("config/taxonomy.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let taxonomy: Taxonomy = toml::from_str(&content)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// 校验分类表结构：ID唯一、关键词与主题列表非空
    pub fn validate(&self) -> Result<()> {
        if self.subjects.is_empty() {
            bail!("分类表为空，至少需要一个科目");
        }

        let mut subject_ids = HashSet::new();
        for subject in &self.subjects {
            if subject.id.trim().is_empty() {
                bail!("科目ID不能为空: {}", subject.label);
            }
            if !subject_ids.insert(subject.id.as_str()) {
                bail!("科目ID重复: {}", subject.id);
            }
            if subject.keywords.is_empty() {
                bail!("科目 {} 的关键词列表为空", subject.id);
            }
            if subject.topics.is_empty() {
                bail!("科目 {} 没有任何主题", subject.id);
            }

            let mut topic_ids = HashSet::new();
            for topic in &subject.topics {
                if topic.id.trim().is_empty() {
                    bail!("科目 {} 下存在空主题ID", subject.id);
                }
                if !topic_ids.insert(topic.id.as_str()) {
                    bail!("科目 {} 下主题ID重复: {}", subject.id, topic.id);
                }
                if topic.keywords.is_empty() {
                    bail!("主题 {}/{} 的关键词列表为空", subject.id, topic.id);
                }
            }
        }

        Ok(())
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn subject_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.subject(id).map(|s| s.label.as_str()).unwrap_or(id)
    }

    /// 科目声明顺序中的第一个主题
    pub fn first_topic(&self, subject_id: &str) -> Option<&str> {
        self.subject(subject_id)
            .and_then(|s| s.topics.first())
            .map(|t| t.id.as_str())
    }

    pub fn topic_belongs_to(&self, subject_id: &str, topic_id: &str) -> bool {
        self.subject(subject_id)
            .map(|s| s.topics.iter().any(|t| t.id == topic_id))
            .unwrap_or(false)
    }
}

fn topic(id: &str, label: &str, keywords: &[&str]) -> Topic {
    Topic {
        id: id.to_string(),
        label: label.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn subject(id: &str, label: &str, keywords: &[&str], topics: Vec<Topic>) -> Subject {
    Subject {
        id: id.to_string(),
        label: label.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        topics,
    }
}

impl Default for Taxonomy {
    /// 内置的 GATE CS 分类表。科目顺序即分类打分时的遍历顺序，不要随意调整
    fn default() -> Self {
        Self {
            subjects: vec![
                subject(
                    "engineering-mathematics",
                    "Engineering Mathematics",
                    &["matrix", "matrices", "determinant", "eigenvalue", "eigenvector",
                      "differential equation", "laplace", "fourier", "probability", "statistics",
                      "mean", "variance", "integration", "differentiation", "limit", "calculus",
                      "linear algebra", "complex number", "vector"],
                    vec![
                        topic("linear-algebra", "Linear Algebra",
                              &["matrix", "determinant", "eigenvalue", "eigenvector", "rank",
                                "inverse", "linear transformation"]),
                        topic("calculus", "Calculus",
                              &["differentiation", "integration", "limit", "maxima", "minima",
                                "taylor", "partial derivative"]),
                        topic("probability", "Probability & Statistics",
                              &["probability", "random variable", "distribution", "mean",
                                "variance", "bayes", "poisson", "binomial", "normal"]),
                        topic("differential-equations", "Differential Equations",
                              &["differential equation", "ode", "pde", "laplace", "fourier"]),
                    ],
                ),
                subject(
                    "data-structures",
                    "Data Structures",
                    &["array", "linked list", "stack", "queue", "tree", "binary tree", "bst",
                      "avl", "heap", "graph", "hash", "hashing", "trie"],
                    vec![
                        topic("arrays-linked-lists", "Arrays & Linked Lists",
                              &["array", "linked list", "doubly linked", "circular"]),
                        topic("stacks-queues", "Stacks & Queues",
                              &["stack", "queue", "deque", "priority queue", "infix", "postfix",
                                "prefix"]),
                        topic("trees", "Trees",
                              &["tree", "binary tree", "bst", "binary search tree", "avl",
                                "red black", "b tree", "b+ tree", "traversal", "inorder",
                                "preorder", "postorder"]),
                        topic("graphs", "Graphs",
                              &["graph", "bfs", "dfs", "dijkstra", "bellman", "floyd", "prim",
                                "kruskal", "mst", "shortest path", "topological"]),
                        topic("hashing", "Hashing",
                              &["hash", "hashing", "collision", "chaining", "open addressing",
                                "load factor"]),
                        topic("heaps", "Heaps",
                              &["heap", "min heap", "max heap", "heapify", "priority queue"]),
                    ],
                ),
                subject(
                    "algorithms",
                    "Algorithms",
                    &["algorithm", "complexity", "sorting", "searching", "divide and conquer",
                      "dynamic programming", "greedy", "backtracking", "time complexity",
                      "space complexity", "big o", "recurrence"],
                    vec![
                        topic("complexity-analysis", "Complexity Analysis",
                              &["time complexity", "space complexity", "big o", "theta", "omega",
                                "asymptotic", "recurrence", "master theorem"]),
                        topic("sorting-searching", "Sorting & Searching",
                              &["sort", "search", "binary search", "merge sort", "quick sort",
                                "heap sort", "bubble sort", "insertion sort", "selection sort",
                                "radix sort", "counting sort"]),
                        topic("divide-conquer", "Divide and Conquer",
                              &["divide and conquer", "merge sort", "quick sort", "binary search",
                                "strassen"]),
                        topic("dynamic-programming", "Dynamic Programming",
                              &["dynamic programming", "dp", "memoization", "tabulation",
                                "knapsack", "lcs", "longest common subsequence",
                                "optimal substructure", "overlapping subproblem"]),
                        topic("greedy-algorithms", "Greedy Algorithms",
                              &["greedy", "activity selection", "huffman", "fractional knapsack",
                                "job scheduling"]),
                    ],
                ),
                subject(
                    "dbms",
                    "Database Management Systems",
                    &["database", "sql", "relational", "normalization", "transaction", "acid",
                      "er model", "schema", "query", "join", "index", "key", "primary key",
                      "foreign key"],
                    vec![
                        topic("er-model", "ER Model",
                              &["er model", "entity", "relationship", "attribute", "cardinality",
                                "participation"]),
                        topic("relational-model", "Relational Model",
                              &["relational", "relation", "tuple", "attribute", "domain",
                                "relational algebra", "relational calculus"]),
                        topic("sql", "SQL",
                              &["sql", "select", "insert", "update", "delete", "join",
                                "inner join", "outer join", "group by", "having", "aggregate",
                                "subquery", "view"]),
                        topic("normalization", "Normalization",
                              &["normalization", "normal form", "1nf", "2nf", "3nf", "bcnf",
                                "4nf", "5nf", "functional dependency", "decomposition",
                                "lossless"]),
                        topic("transactions", "Transactions & Concurrency",
                              &["transaction", "acid", "atomicity", "consistency", "isolation",
                                "durability", "schedule", "serializability", "lock", "deadlock",
                                "two phase locking", "2pl"]),
                        topic("indexing", "Indexing",
                              &["index", "b tree", "b+ tree", "hash index", "clustering",
                                "primary index", "secondary index"]),
                    ],
                ),
                subject(
                    "operating-systems",
                    "Operating Systems",
                    &["process", "thread", "scheduling", "memory", "virtual memory", "paging",
                      "segmentation", "deadlock", "synchronization", "semaphore", "mutex",
                      "file system", "cpu scheduling"],
                    vec![
                        topic("process-management", "Process Management",
                              &["process", "thread", "pcb", "context switch", "fork", "exec",
                                "ipc", "inter process"]),
                        topic("cpu-scheduling", "CPU Scheduling",
                              &["scheduling", "fcfs", "sjf", "srtf", "round robin", "priority",
                                "multilevel", "turnaround time", "waiting time",
                                "response time"]),
                        topic("synchronization", "Process Synchronization",
                              &["synchronization", "critical section", "mutex", "semaphore",
                                "monitor", "producer consumer", "reader writer",
                                "dining philosopher"]),
                        topic("deadlocks", "Deadlocks",
                              &["deadlock", "banker", "resource allocation", "safe state",
                                "unsafe state", "deadlock prevention", "deadlock avoidance",
                                "deadlock detection"]),
                        topic("memory-management", "Memory Management",
                              &["memory", "paging", "segmentation", "virtual memory",
                                "page fault", "page replacement", "lru", "fifo", "optimal",
                                "tlb", "page table", "thrashing"]),
                        topic("file-systems", "File Systems",
                              &["file", "directory", "inode", "allocation", "contiguous",
                                "linked", "indexed", "fat", "ntfs"]),
                    ],
                ),
                subject(
                    "computer-networks",
                    "Computer Networks",
                    &["network", "osi", "tcp", "ip", "udp", "http", "dns", "routing",
                      "switching", "protocol", "layer", "packet", "frame", "socket", "port"],
                    vec![
                        topic("osi-tcp", "OSI & TCP/IP Models",
                              &["osi", "tcp/ip", "layer", "physical", "data link", "network",
                                "transport", "session", "presentation", "application"]),
                        topic("data-link-layer", "Data Link Layer",
                              &["data link", "mac", "llc", "framing", "error detection",
                                "error correction", "crc", "hamming", "sliding window", "aloha",
                                "csma", "ethernet"]),
                        topic("network-layer", "Network Layer",
                              &["network layer", "ip", "ipv4", "ipv6", "routing", "rip", "ospf",
                                "bgp", "subnet", "cidr", "nat", "icmp"]),
                        topic("transport-layer", "Transport Layer",
                              &["transport", "tcp", "udp", "port", "socket", "congestion",
                                "flow control", "three way handshake", "connection"]),
                        topic("application-layer", "Application Layer",
                              &["application", "http", "https", "ftp", "smtp", "dns", "dhcp",
                                "telnet", "ssh"]),
                    ],
                ),
                subject(
                    "toc",
                    "Theory of Computation",
                    &["automata", "grammar", "language", "dfa", "nfa", "pda", "turing machine",
                      "regular", "context free", "decidable", "undecidable", "halting problem",
                      "cfg", "cfl"],
                    vec![
                        topic("finite-automata", "Finite Automata",
                              &["dfa", "nfa", "finite automata", "state", "transition",
                                "acceptance", "epsilon", "nfa to dfa", "minimization"]),
                        topic("regular-languages", "Regular Languages",
                              &["regular", "regular expression", "regex", "pumping lemma",
                                "regular grammar", "closure"]),
                        topic("cfg-pda", "CFG & PDA",
                              &["cfg", "context free grammar", "pda", "pushdown automata", "cnf",
                                "gnf", "chomsky", "derivation", "parse tree", "ambiguity"]),
                        topic("turing-machines", "Turing Machines",
                              &["turing machine", "tm", "tape", "computation", "recursive",
                                "recursively enumerable"]),
                        topic("decidability", "Decidability",
                              &["decidable", "undecidable", "halting problem", "rice theorem",
                                "reduction", "recursive", "re"]),
                    ],
                ),
                subject(
                    "compiler-design",
                    "Compiler Design",
                    &["compiler", "lexical", "syntax", "semantic", "parser", "lexer", "token",
                      "grammar", "parsing", "ll", "lr", "lalr", "slr", "code generation",
                      "optimization"],
                    vec![
                        topic("lexical-analysis", "Lexical Analysis",
                              &["lexical", "lexer", "scanner", "token", "lexeme", "pattern",
                                "regular expression"]),
                        topic("parsing", "Syntax Analysis",
                              &["parsing", "parser", "syntax", "ll(1)", "lr(0)", "slr", "lalr",
                                "lr(1)", "first", "follow", "shift", "reduce", "handle"]),
                        topic("syntax-directed", "Syntax Directed Translation",
                              &["sdt", "syntax directed", "attribute", "synthesized",
                                "inherited", "s-attributed", "l-attributed"]),
                        topic("code-optimization", "Code Optimization",
                              &["optimization", "code generation", "intermediate code",
                                "three address", "dag", "basic block", "peephole",
                                "loop optimization"]),
                    ],
                ),
                subject(
                    "digital-logic",
                    "Digital Logic",
                    &["boolean", "logic gate", "and", "or", "not", "nand", "nor", "xor",
                      "flip flop", "counter", "register", "multiplexer", "demultiplexer",
                      "decoder", "encoder", "combinational", "sequential"],
                    vec![
                        topic("boolean-algebra", "Boolean Algebra",
                              &["boolean", "boolean algebra", "karnaugh", "k-map", "sop", "pos",
                                "minterm", "maxterm", "simplification"]),
                        topic("combinational-circuits", "Combinational Circuits",
                              &["combinational", "multiplexer", "mux", "demux", "decoder",
                                "encoder", "adder", "subtractor", "comparator"]),
                        topic("sequential-circuits", "Sequential Circuits",
                              &["sequential", "flip flop", "sr", "jk", "d flip flop",
                                "t flip flop", "latch", "counter", "register", "state machine",
                                "mealy", "moore"]),
                    ],
                ),
                subject(
                    "computer-organization",
                    "Computer Organization & Architecture",
                    &["cpu", "processor", "instruction", "pipeline", "cache",
                      "memory hierarchy", "addressing mode", "risc", "cisc", "io", "dma",
                      "interrupt"],
                    vec![
                        topic("cpu-architecture", "CPU Architecture",
                              &["cpu", "alu", "control unit", "instruction", "instruction cycle",
                                "fetch", "decode", "execute", "addressing mode", "risc",
                                "cisc"]),
                        topic("pipelining", "Pipelining",
                              &["pipeline", "hazard", "data hazard", "control hazard",
                                "structural hazard", "forwarding", "stall",
                                "branch prediction"]),
                        topic("memory-hierarchy", "Memory Hierarchy",
                              &["cache", "memory", "hit", "miss", "hit rate", "miss rate",
                                "direct mapped", "set associative", "fully associative",
                                "write through", "write back"]),
                        topic("io-systems", "I/O Systems",
                              &["io", "input output", "dma", "interrupt", "polling",
                                "programmed io", "memory mapped"]),
                    ],
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_taxonomy_is_valid() {
        let taxonomy = Taxonomy::default();
        assert!(taxonomy.validate().is_ok());
        assert_eq!(taxonomy.subjects.len(), 10);
    }

    #[test]
    fn first_topic_follows_declaration_order() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.first_topic("data-structures"), Some("arrays-linked-lists"));
        assert_eq!(taxonomy.first_topic("dbms"), Some("er-model"));
        assert_eq!(taxonomy.first_topic("no-such-subject"), None);
    }

    #[test]
    fn topic_membership() {
        let taxonomy = Taxonomy::default();
        assert!(taxonomy.topic_belongs_to("data-structures", "graphs"));
        assert!(!taxonomy.topic_belongs_to("dbms", "graphs"));
    }

    #[test]
    fn duplicate_subject_id_rejected() {
        let mut taxonomy = Taxonomy::default();
        let dup = taxonomy.subjects[0].clone();
        taxonomy.subjects.push(dup);
        assert!(taxonomy.validate().is_err());
    }

    #[test]
    fn empty_keywords_rejected() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.subjects[0].keywords.clear();
        assert!(taxonomy.validate().is_err());
    }
}
